//! Pending subscription registry.
//!
//! Maps a contact identifier to the secret issued for it while the
//! subscription awaits confirmation. State is in memory only and is lost on
//! restart.

mod memory;

pub use memory::{Claim, PendingRegistry};

use thiserror::Error;

/// Why a pending entry could not be claimed for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// No live entry for the identifier (never registered, consumed or expired)
    #[error("no pending subscription for identifier")]
    Unknown,

    /// Another confirmation for the same identifier is in progress
    #[error("confirmation already in progress")]
    InFlight,

    /// The presented secret differs from the stored one
    #[error("secret does not match")]
    Mismatch,
}
