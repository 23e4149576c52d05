//! Gmail client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GmailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Send failed: {status} - {message}")]
    SendFailed { status: u16, message: String },
}
