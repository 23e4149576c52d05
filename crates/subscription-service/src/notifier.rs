//! Outbound notification collaborators.

use async_trait::async_trait;
use gmail_client::{GmailClient, GmailError};
use thiserror::Error;
use tracing::{info, instrument};

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Mail delivery failed: {0}")]
    Mail(#[from] GmailError),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Delivers confirmation mail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError>;
}

/// Delivers confirmation tokens to phone numbers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhoneNotifier: Send + Sync {
    async fn send_code(&self, to: &str, token: &str) -> Result<(), NotifierError>;
}

#[async_trait]
impl EmailNotifier for GmailClient {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        let message_id = self.send(to, subject, body).await?;
        info!(to, %message_id, "Confirmation mail sent");
        Ok(())
    }
}

/// Email notifier that only logs. Used when no mail credentials are configured.
#[derive(Debug, Clone, Default)]
pub struct LogEmailNotifier;

#[async_trait]
impl EmailNotifier for LogEmailNotifier {
    #[instrument(skip(self, body))]
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        info!(to, subject, body_len = body.len(), "Mail delivery disabled, not sending");
        Ok(())
    }
}

/// Phone notifier that only logs.
// TODO: wire an SMS gateway once a provider is chosen
#[derive(Debug, Clone, Default)]
pub struct LogPhoneNotifier;

#[async_trait]
impl PhoneNotifier for LogPhoneNotifier {
    #[instrument(skip(self, token))]
    async fn send_code(&self, to: &str, token: &str) -> Result<(), NotifierError> {
        info!(to, token_len = token.len(), "SMS delivery not configured, not sending");
        Ok(())
    }
}
