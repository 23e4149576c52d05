//! Verification of confirmation tokens.

use crate::channel::ContactChannel;
use crate::records::RecordUpdater;
use crate::registry::{ClaimError, PendingRegistry};
use crate::token::{ConfirmationToken, TokenError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Why a token did not confirm a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyRejection {
    #[error("malformed token: {0}")]
    MalformedToken(#[from] TokenError),

    #[error("unknown or expired token")]
    UnknownOrExpiredToken,

    #[error("secret mismatch")]
    SecretMismatch,

    #[error("record update failed: {0}")]
    PersistenceFailure(String),
}

/// A confirmed subscription channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    pub channel: ContactChannel,
    pub doc_id: String,
}

/// Confirms pending subscriptions against the backing record store.
#[derive(Clone)]
pub struct VerificationService {
    registry: PendingRegistry,
    records: Arc<dyn RecordUpdater>,
    collection: String,
    update_timeout: Duration,
}

impl VerificationService {
    pub fn new(
        registry: PendingRegistry,
        records: Arc<dyn RecordUpdater>,
        collection: impl Into<String>,
        update_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            records,
            collection: collection.into(),
            update_timeout,
        }
    }

    /// Verify a token and, if it matches a pending entry, mark the record.
    ///
    /// The record is updated before the pending entry is consumed. If the
    /// update fails the entry stays pending and the same token can be used
    /// again.
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &str) -> Result<Confirmed, VerifyRejection> {
        let decoded = ConfirmationToken::decode(token).map_err(|e| {
            warn!(error = %e, "Rejecting malformed token");
            VerifyRejection::from(e)
        })?;
        let channel = ContactChannel::classify(decoded.identifier);
        let kind = channel.kind();

        let claim = self
            .registry
            .claim(channel.identifier(), &decoded.secret)
            .map_err(|e| {
                warn!(%channel, doc_id = %decoded.doc_id, reason = %e, "Token not accepted");
                match e {
                    ClaimError::Unknown | ClaimError::InFlight => {
                        VerifyRejection::UnknownOrExpiredToken
                    }
                    ClaimError::Mismatch => VerifyRejection::SecretMismatch,
                }
            })?;

        let update = self.records.update_record(
            &self.collection,
            &decoded.doc_id,
            kind.record_field(),
            true,
        );

        // An early return drops `claim`, which releases the entry
        match tokio::time::timeout(self.update_timeout, update).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(%channel, doc_id = %decoded.doc_id, error = %e, "Record update failed");
                return Err(VerifyRejection::PersistenceFailure(e.to_string()));
            }
            Err(_) => {
                warn!(%channel, doc_id = %decoded.doc_id, timeout = ?self.update_timeout, "Record update timed out");
                return Err(VerifyRejection::PersistenceFailure(
                    "record update timed out".to_string(),
                ));
            }
        }

        claim.commit();
        info!(%channel, doc_id = %decoded.doc_id, "Subscription confirmed");

        Ok(Confirmed {
            channel,
            doc_id: decoded.doc_id,
        })
    }
}
