//! Shared fixtures for the API integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subscription_service::{
    api::{create_router, AppState},
    notifier::{EmailNotifier, LogPhoneNotifier, NotifierError},
    records::{MemoryRecords, RecordError, RecordUpdater},
    registry::PendingRegistry,
    services::{SubscriptionService, SubscriptionSettings, VerificationService},
};

pub const PUBLIC_URL: &str = "http://subscribe.test";
pub const COLLECTION: &str = "subscriptions";

/// A sent mail.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that keeps every message it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait until at least `count` mails went out. Delivery runs in the
    /// background, after the subscribe response.
    pub async fn wait_for_mail(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.sent.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("mail was not delivered in time");
    }

    /// Verification link from the most recent mail to `to`.
    pub fn link_for(&self, to: &str) -> String {
        let sent = self.sent();
        let mail = sent
            .iter()
            .rev()
            .find(|m| m.to == to)
            .expect("no mail sent to address");
        mail.body
            .lines()
            .find(|line| line.starts_with(PUBLIC_URL))
            .expect("no link in mail body")
            .to_string()
    }

    /// Request path of the most recent link sent to `to`.
    pub fn path_for(&self, to: &str) -> String {
        self.link_for(to)
            .strip_prefix(PUBLIC_URL)
            .expect("link outside public url")
            .to_string()
    }
}

#[async_trait]
impl EmailNotifier for RecordingMailer {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Mailer whose provider always refuses.
pub struct FailingMailer;

#[async_trait]
impl EmailNotifier for FailingMailer {
    async fn send_email(&self, _: &str, _: &str, _: &str) -> Result<(), NotifierError> {
        Err(NotifierError::Delivery("provider unavailable".into()))
    }
}

/// Mailer that never answers in time.
pub struct SlowMailer(pub Duration);

#[async_trait]
impl EmailNotifier for SlowMailer {
    async fn send_email(&self, _: &str, _: &str, _: &str) -> Result<(), NotifierError> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

/// In-memory records that count calls and can be made to fail or stall.
#[derive(Clone, Default)]
pub struct CountingRecords {
    pub inner: MemoryRecords,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl CountingRecords {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordUpdater for CountingRecords {
    async fn update_record(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        value: bool,
    ) -> Result<(), RecordError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RecordError::Unavailable("store offline".into()));
        }
        self.inner.update_record(collection, doc_id, field, value).await
    }
}

/// A router wired to the given collaborators.
pub struct TestApp {
    pub router: Router,
    pub registry: PendingRegistry,
}

pub fn test_app(
    mailer: Arc<dyn EmailNotifier>,
    records: Arc<dyn RecordUpdater>,
    notify_timeout: Duration,
) -> TestApp {
    let registry = PendingRegistry::new(None);

    let subscriptions = SubscriptionService::new(
        registry.clone(),
        mailer,
        Arc::new(LogPhoneNotifier),
        SubscriptionSettings {
            public_url: PUBLIC_URL.to_string(),
            notify_timeout,
            ..SubscriptionSettings::default()
        },
    );
    let verification = VerificationService::new(
        registry.clone(),
        records,
        COLLECTION,
        Duration::from_secs(5),
    );

    TestApp {
        router: create_router(AppState::new(registry.clone(), subscriptions, verification)),
        registry,
    }
}
