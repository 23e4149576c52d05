//! Error types for the subscription service HTTP surface.

use crate::services::SubscribeRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors returned as JSON by the API.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Rejected(#[from] SubscribeRejection),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServiceError::Rejected(SubscribeRejection::MissingDocId) => {
                (StatusCode::BAD_REQUEST, "MISSING_DOC_ID")
            }
            ServiceError::Rejected(SubscribeRejection::NoChannelProvided) => {
                (StatusCode::BAD_REQUEST, "NO_CHANNEL_PROVIDED")
            }
            ServiceError::Rejected(SubscribeRejection::InvalidField(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_FIELD")
            }
        };

        let body = ErrorResponse {
            message: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
