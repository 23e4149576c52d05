//! API request and response types.

use crate::services::SubscribeRequest;
use serde::{Deserialize, Serialize};

/// Query parameters of `GET /subscription`.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeParams {
    #[serde(rename = "docID")]
    pub doc_id: Option<String>,

    pub email: Option<String>,

    pub phone: Option<String>,
}

impl From<SubscribeParams> for SubscribeRequest {
    fn from(params: SubscribeParams) -> Self {
        Self {
            doc_id: params.doc_id,
            email: params.email,
            phone: params.phone,
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub pending_count: usize,
}
