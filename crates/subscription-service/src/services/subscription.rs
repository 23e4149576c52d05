//! Subscription requests: issue secrets and send confirmation links.

use crate::channel::ChannelKind;
use crate::notifier::{EmailNotifier, NotifierError, PhoneNotifier};
use crate::registry::PendingRegistry;
use crate::token;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn, Instrument};
use uuid::Uuid;

/// Length of the short code issued to phone numbers.
pub const PHONE_SECRET_LEN: usize = 4;

/// Why a subscription request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeRejection {
    #[error("docID not found")]
    MissingDocId,

    #[error("Email or Phone required")]
    NoChannelProvided,

    #[error("{0} must not contain \"__\" or end with \"_\"")]
    InvalidField(&'static str),
}

/// Raw subscription request parameters.
#[derive(Debug, Clone, Default)]
pub struct SubscribeRequest {
    pub doc_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A successful subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub doc_id: String,
    pub channels: Vec<ChannelKind>,
}

/// Settings for confirmation messages.
#[derive(Debug, Clone)]
pub struct SubscriptionSettings {
    /// Base URL that verification links are built on
    pub public_url: String,
    pub email_subject: String,
    pub signature: String,
    /// Upper bound on a single notifier call
    pub notify_timeout: Duration,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8080".into(),
            email_subject: "Confirm your notification subscription".into(),
            signature: "Earthquake Notification Service".into(),
            notify_timeout: Duration::from_secs(10),
        }
    }
}

/// Registers pending subscriptions and dispatches confirmation links.
#[derive(Clone)]
pub struct SubscriptionService {
    registry: PendingRegistry,
    email: Arc<dyn EmailNotifier>,
    phone: Arc<dyn PhoneNotifier>,
    settings: SubscriptionSettings,
}

impl SubscriptionService {
    pub fn new(
        registry: PendingRegistry,
        email: Arc<dyn EmailNotifier>,
        phone: Arc<dyn PhoneNotifier>,
        settings: SubscriptionSettings,
    ) -> Self {
        Self {
            registry,
            email,
            phone,
            settings,
        }
    }

    /// Register every channel present in `request` and notify it.
    ///
    /// Returns as soon as the registry holds the new secrets. Confirmation
    /// messages go out on a background task; their failures are logged and
    /// do not affect the outcome. Must be called within a Tokio runtime.
    #[instrument(skip(self, request), fields(doc_id = request.doc_id.as_deref().unwrap_or("")))]
    pub async fn subscribe(&self, request: SubscribeRequest) -> Result<Accepted, SubscribeRejection> {
        let (accepted, deliveries) = self.register(request)?;
        tokio::spawn(deliveries.run().in_current_span());
        Ok(accepted)
    }

    /// Validate `request` and store a fresh secret per channel.
    ///
    /// All validation happens before the registry is touched.
    fn register(&self, request: SubscribeRequest) -> Result<(Accepted, Deliveries), SubscribeRejection> {
        let doc_id = request
            .doc_id
            .filter(|d| !d.is_empty())
            .ok_or(SubscribeRejection::MissingDocId)?;
        let email = request.email.filter(|e| !e.is_empty());
        let phone = request.phone.filter(|p| !p.is_empty());

        if email.is_none() && phone.is_none() {
            return Err(SubscribeRejection::NoChannelProvided);
        }

        for (name, value) in [
            ("docID", Some(&doc_id)),
            ("email", email.as_ref()),
            ("phone", phone.as_ref()),
        ] {
            if value.is_some_and(|v| !token::is_encodable_field(v)) {
                return Err(SubscribeRejection::InvalidField(name));
            }
        }

        let mut channels = Vec::with_capacity(2);

        let email = email.map(|address| {
            let secret = Uuid::new_v4().to_string();
            self.registry.put(address.clone(), secret.clone());
            info!(email = %address, "Pending email subscription registered");
            channels.push(ChannelKind::Email);

            let body = self.email_body(&token::encode(&doc_id, &address, &secret));
            (address, body)
        });

        let phone = phone.map(|number| {
            let secret: String = Uuid::new_v4()
                .to_string()
                .chars()
                .take(PHONE_SECRET_LEN)
                .collect();
            self.registry.put(number.clone(), secret.clone());
            info!(phone = %number, "Pending phone subscription registered");
            channels.push(ChannelKind::Phone);

            let token = token::encode(&doc_id, &number, &secret);
            (number, token)
        });

        let deliveries = Deliveries {
            email_notifier: self.email.clone(),
            phone_notifier: self.phone.clone(),
            subject: self.settings.email_subject.clone(),
            timeout: self.settings.notify_timeout,
            email,
            phone,
        };

        Ok((Accepted { doc_id, channels }, deliveries))
    }

    /// Verification link for an encoded token.
    pub fn verification_url(&self, token: &str) -> String {
        format!(
            "{}/verification/{}",
            self.settings.public_url.trim_end_matches('/'),
            urlencoding::encode(token)
        )
    }

    fn email_body(&self, token: &str) -> String {
        format!(
            "Hello,\n\n\
             You have subscribed to earthquake notifications.\n\n\
             Kindly open the link below to confirm your subscription:\n\
             {}\n\n\
             Regards,\n\
             {}",
            self.verification_url(token),
            self.settings.signature
        )
    }
}

/// Confirmation messages owed for an accepted request.
struct Deliveries {
    email_notifier: Arc<dyn EmailNotifier>,
    phone_notifier: Arc<dyn PhoneNotifier>,
    subject: String,
    timeout: Duration,
    /// Address and mail body
    email: Option<(String, String)>,
    /// Number and token
    phone: Option<(String, String)>,
}

impl Deliveries {
    /// Send every message, each bounded by the notifier timeout.
    async fn run(self) {
        let email = async {
            if let Some((address, body)) = &self.email {
                let send = self.email_notifier.send_email(address, &self.subject, body);
                deliver(ChannelKind::Email, address, self.timeout, send).await;
            }
        };
        let phone = async {
            if let Some((number, token)) = &self.phone {
                let send = self.phone_notifier.send_code(number, token);
                deliver(ChannelKind::Phone, number, self.timeout, send).await;
            }
        };

        tokio::join!(email, phone);
    }
}

async fn deliver<F>(kind: ChannelKind, to: &str, timeout: Duration, send: F)
where
    F: Future<Output = Result<(), NotifierError>>,
{
    match tokio::time::timeout(timeout, send).await {
        Ok(Ok(())) => debug!(%kind, to, "Confirmation dispatched"),
        Ok(Err(e)) => warn!(%kind, to, error = %e, "Confirmation delivery failed"),
        Err(_) => warn!(%kind, to, ?timeout, "Confirmation delivery timed out"),
    }
}
