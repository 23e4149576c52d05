//! HTTP request handlers.

use super::types::{HealthResponse, MessageResponse, SubscribeParams};
use super::{views, AppState};
use crate::error::ServiceError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::info;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        pending_count: state.registry.len(),
    })
}

/// Register a pending subscription and send confirmation links.
pub async fn subscribe(
    State(state): State<AppState>,
    Query(params): Query<SubscribeParams>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let accepted = state.subscriptions.subscribe(params.into()).await?;

    info!(doc_id = %accepted.doc_id, channels = ?accepted.channels, "Subscription accepted");

    Ok(Json(MessageResponse {
        message: "Subscription Successful".to_string(),
    }))
}

/// Confirm a subscription from a verification link.
///
/// Always answers with a page, since the caller is a person in a browser.
pub async fn verify(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let token = token.trim_start_matches('/');

    match state.verification.verify(token).await {
        Ok(confirmed) => (StatusCode::OK, views::confirmation(&confirmed)).into_response(),
        Err(rejection) => views::rejection(&rejection).into_response(),
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html("<h1>Not found</h1>"))
}
