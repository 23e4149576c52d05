//! Subscription confirmation service.
//!
//! Users register an email address or phone number against a subscriber
//! document. Each channel receives a single-use link, and following it marks
//! the channel as verified on the backing record:
//! - Pending secrets live in an in-memory registry with a configurable TTL
//! - Confirmation emails go out through Gmail, codes through a phone notifier
//! - Verified flags are written to Firestore

pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod notifier;
pub mod records;
pub mod registry;
pub mod services;
pub mod token;

pub use channel::{ChannelKind, ContactChannel};
pub use config::Config;
pub use error::ServiceError;
pub use registry::{ClaimError, PendingRegistry};
pub use services::{SubscriptionService, VerificationService};
pub use token::ConfirmationToken;
