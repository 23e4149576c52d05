//! Gmail REST API client for outbound notification mail.

mod client;
mod error;
mod types;

pub use client::{build_message, GmailClient, DEFAULT_BASE_URL, DEFAULT_USER_ID};
pub use error::GmailError;
pub use types::*;
