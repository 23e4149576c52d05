//! Gmail API types.

use serde::{Deserialize, Serialize};

/// Body of a `users.messages.send` request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    /// RFC 5322 message, URL-safe base64 encoded
    pub raw: String,
}

/// Message resource returned after sending.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub label_ids: Vec<String>,
}
