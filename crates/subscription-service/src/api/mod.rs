//! HTTP API for the subscription service.

mod handlers;
mod middleware;
mod types;
pub mod views;

pub use handlers::*;
pub use middleware::logging_middleware;
pub use types::*;

use crate::registry::PendingRegistry;
use crate::services::{SubscriptionService, VerificationService};
use axum::{
    extract::Request,
    http::{header, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// How long browsers may cache a CORS preflight answer.
const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Pending subscriptions awaiting confirmation
    pub registry: PendingRegistry,
    /// Subscription intake
    pub subscriptions: Arc<SubscriptionService>,
    /// Token verification
    pub verification: Arc<VerificationService>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        registry: PendingRegistry,
        subscriptions: SubscriptionService,
        verification: VerificationService,
    ) -> Self {
        Self {
            registry,
            subscriptions: Arc::new(subscriptions),
            verification: Arc::new(verification),
        }
    }
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, header::ORIGIN, header::ACCEPT])
        .max_age(CORS_MAX_AGE);

    // Spans carry the method only; verification URIs contain tokens
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| tracing::debug_span!("request", method = %request.method()));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/subscription", get(handlers::subscribe))
        .route("/verification/*token", get(handlers::verify))
        .fallback(handlers::not_found)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(trace)
        .layer(cors)
        .with_state(state)
}
