//! Subscription service - Entry point.

use firestore_client::FirestoreClient;
use gmail_client::GmailClient;
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use subscription_service::{
    api::{create_router, AppState},
    config::Config,
    notifier::{EmailNotifier, LogEmailNotifier, LogPhoneNotifier},
    records::{MemoryRecords, RecordUpdater},
    registry::PendingRegistry,
    services::{SubscriptionService, SubscriptionSettings, VerificationService},
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Timeout of the underlying HTTP clients.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting subscription service");

    let registry = PendingRegistry::new(Some(config.registry.ttl));
    let _sweeper = registry.spawn_sweeper(config.registry.sweep_interval);
    info!(ttl = ?config.registry.ttl, "Pending registry ready");

    let records = match build_records(&config) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to create Firestore client: {}", e);
            std::process::exit(1);
        }
    };

    let mailer = match build_mailer(&config) {
        Ok(m) => m,
        Err(e) => {
            error!("Failed to create Gmail client: {}", e);
            std::process::exit(1);
        }
    };

    let subscriptions = SubscriptionService::new(
        registry.clone(),
        mailer,
        Arc::new(LogPhoneNotifier),
        SubscriptionSettings {
            public_url: config.server.public_url.clone(),
            email_subject: config.notifications.subject.clone(),
            signature: config.notifications.signature.clone(),
            notify_timeout: config.collaborators.timeout,
        },
    );

    let verification = VerificationService::new(
        registry.clone(),
        records,
        config.records.collection.clone(),
        config.collaborators.timeout,
    );

    let app = create_router(AppState::new(registry, subscriptions, verification));

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn build_records(config: &Config) -> Result<Arc<dyn RecordUpdater>, firestore_client::FirestoreError> {
    let Some(project_id) = config.firestore.project_id.as_deref() else {
        warn!("FIRESTORE__PROJECT_ID not set, verified flags are kept in memory only");
        return Ok(Arc::new(MemoryRecords::new()));
    };

    let mut client = FirestoreClient::new(&config.firestore.base_url, project_id, CLIENT_TIMEOUT)?;
    if let Some(token) = &config.firestore.access_token {
        client = client.with_access_token(token.expose_secret().as_str());
    }

    info!(project_id, collection = %config.records.collection, "Using Firestore records");
    Ok(Arc::new(client))
}

fn build_mailer(config: &Config) -> Result<Arc<dyn EmailNotifier>, gmail_client::GmailError> {
    let Some(token) = &config.gmail.access_token else {
        warn!("GMAIL__ACCESS_TOKEN not set, confirmation emails are only logged");
        return Ok(Arc::new(LogEmailNotifier));
    };

    let client = GmailClient::new(
        &config.gmail.base_url,
        &config.gmail.user_id,
        token.expose_secret().as_str(),
        CLIENT_TIMEOUT,
    )?;

    info!(user_id = %config.gmail.user_id, "Using Gmail notifier");
    Ok(Arc::new(client))
}
