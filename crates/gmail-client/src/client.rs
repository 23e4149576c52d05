//! Gmail HTTP client.

use crate::error::GmailError;
use crate::types::*;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Public Gmail API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com";

/// The authenticated mailbox.
pub const DEFAULT_USER_ID: &str = "me";

/// Gmail REST API client restricted to sending plain-text mail.
#[derive(Clone)]
pub struct GmailClient {
    client: Client,
    base_url: String,
    user_id: String,
    access_token: SecretString,
}

impl GmailClient {
    /// Create a new Gmail client.
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GmailError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
            access_token: SecretString::new(access_token.into()),
        })
    }

    /// Send a plain-text message and return the provider message id.
    #[instrument(skip(self, body))]
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, GmailError> {
        let message = build_message(to, subject, body)?;
        let request = SendMessageRequest {
            raw: URL_SAFE.encode(message.as_bytes()),
        };

        let response = self
            .client
            .post(format!(
                "{}/gmail/v1/users/{}/messages/send",
                self.base_url,
                encode(&self.user_id)
            ))
            .bearer_auth(self.access_token.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%status, "Gmail send failed");
            return match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GmailError::Unauthorized),
                _ => Err(GmailError::SendFailed {
                    status: status.as_u16(),
                    message,
                }),
            };
        }

        let sent: SentMessage = response.json().await?;
        debug!(message_id = %sent.id, "Mail accepted by Gmail");
        Ok(sent.id)
    }
}

/// Render an RFC 5322 plain-text message.
///
/// Header values may not contain line breaks. A non-ASCII subject is
/// RFC 2047 encoded.
pub fn build_message(to: &str, subject: &str, body: &str) -> Result<String, GmailError> {
    if to.is_empty() || has_line_break(to) {
        return Err(GmailError::InvalidHeader("To"));
    }
    if has_line_break(subject) {
        return Err(GmailError::InvalidHeader("Subject"));
    }

    let subject = if subject.is_ascii() {
        subject.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(subject.as_bytes()))
    };

    Ok(format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{}",
        to, subject, body
    ))
}

fn has_line_break(value: &str) -> bool {
    value.contains('\r') || value.contains('\n')
}
