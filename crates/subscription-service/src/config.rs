//! Configuration for the subscription service.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Pending registry configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Backing record configuration
    #[serde(default)]
    pub records: RecordsConfig,

    /// Firestore configuration
    #[serde(default)]
    pub firestore: FirestoreConfig,

    /// Gmail configuration
    #[serde(default)]
    pub gmail: GmailConfig,

    /// Confirmation message configuration
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Collaborator call limits
    #[serde(default)]
    pub collaborators: CollaboratorConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally reachable base URL used in verification links
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Lifetime of a pending subscription
    #[serde(default = "default_registry_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// How often expired entries are purged
    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    pub sweep_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordsConfig {
    /// Collection holding subscription records
    #[serde(default = "default_collection")]
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreConfig {
    /// Firestore REST endpoint
    #[serde(default = "default_firestore_url")]
    pub base_url: String,

    /// Google Cloud project id. Records are kept in memory when unset.
    #[serde(default)]
    pub project_id: Option<String>,

    /// OAuth2 access token
    #[serde(default)]
    pub access_token: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GmailConfig {
    /// Gmail REST endpoint
    #[serde(default = "default_gmail_url")]
    pub base_url: String,

    /// Sending mailbox
    #[serde(default = "default_gmail_user")]
    pub user_id: String,

    /// OAuth2 access token. Mail is only logged when unset.
    #[serde(default)]
    pub access_token: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Subject of the confirmation mail
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Closing line of the confirmation mail
    #[serde(default = "default_signature")]
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollaboratorConfig {
    /// Upper bound on a notifier or record store call
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            public_url: default_public_url(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ttl: default_registry_ttl(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
        }
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_firestore_url(),
            project_id: None,
            access_token: None,
        }
    }
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            base_url: default_gmail_url(),
            user_id: default_gmail_user(),
            access_token: None,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            signature: default_signature(),
        }
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "http://localhost:8080".into()
}

fn default_registry_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_collection() -> String {
    "subscriptions".into()
}

fn default_firestore_url() -> String {
    firestore_client::DEFAULT_BASE_URL.into()
}

fn default_gmail_url() -> String {
    gmail_client::DEFAULT_BASE_URL.into()
}

fn default_gmail_user() -> String {
    gmail_client::DEFAULT_USER_ID.into()
}

fn default_subject() -> String {
    "Confirm your notification subscription".into()
}

fn default_signature() -> String {
    "Earthquake Notification Service".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nested keys use `__`, e.g. `SERVER__PORT=8080` or `REGISTRY__TTL=2h`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.public_url, "http://localhost:8080");
        assert_eq!(config.registry.ttl, Duration::from_secs(86_400));
        assert_eq!(config.records.collection, "subscriptions");
        assert!(config.firestore.project_id.is_none());
        assert!(config.gmail.access_token.is_none());
        assert_eq!(config.collaborators.timeout, Duration::from_secs(10));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_humantime_durations() {
        let config: Config = serde_json::from_str(
            r#"{
                "registry": { "ttl": "2h", "sweep_interval": "30s" },
                "collaborators": { "timeout": "1500ms" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.registry.ttl, Duration::from_secs(7200));
        assert_eq!(config.registry.sweep_interval, Duration::from_secs(30));
        assert_eq!(config.collaborators.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let config: Config = serde_json::from_str(
            r#"{ "gmail": { "access_token": "ya29.very-secret" } }"#,
        )
        .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("ya29.very-secret"));
    }
}
