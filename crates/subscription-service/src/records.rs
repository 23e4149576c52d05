//! Backing record store collaborators.

use async_trait::async_trait;
use firestore_client::{FirestoreClient, FirestoreError, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Record update errors.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Record store error: {0}")]
    Firestore(#[from] FirestoreError),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Sets flags on records in the backing store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    async fn update_record(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        value: bool,
    ) -> Result<(), RecordError>;
}

#[async_trait]
impl RecordUpdater for FirestoreClient {
    async fn update_record(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        value: bool,
    ) -> Result<(), RecordError> {
        self.update_field(collection, doc_id, field, Value::from(value))
            .await
            .map_err(|e| match e {
                FirestoreError::NotFound(path) => RecordError::NotFound(path),
                other => RecordError::Firestore(other),
            })?;
        Ok(())
    }
}

type Fields = HashMap<String, bool>;

/// In-memory record store.
///
/// Records are created on first update. Used in development and tests.
#[derive(Clone, Default)]
pub struct MemoryRecords {
    records: Arc<RwLock<HashMap<(String, String), Fields>>>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a flag from a record.
    pub async fn field(&self, collection: &str, doc_id: &str, field: &str) -> Option<bool> {
        let records = self.records.read().await;
        records
            .get(&(collection.to_string(), doc_id.to_string()))
            .and_then(|fields| fields.get(field).copied())
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RecordUpdater for MemoryRecords {
    #[instrument(skip(self))]
    async fn update_record(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        value: bool,
    ) -> Result<(), RecordError> {
        let mut records = self.records.write().await;
        records
            .entry((collection.to_string(), doc_id.to_string()))
            .or_default()
            .insert(field.to_string(), value);

        debug!("Record updated in memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_records_update() {
        let records = MemoryRecords::new();
        assert_eq!(records.field("subscriptions", "doc1", "email").await, None);

        records
            .update_record("subscriptions", "doc1", "email", true)
            .await
            .unwrap();

        assert_eq!(records.field("subscriptions", "doc1", "email").await, Some(true));
        assert_eq!(records.field("subscriptions", "doc1", "phone").await, None);
        assert_eq!(records.count().await, 1);
    }

    #[tokio::test]
    async fn test_memory_records_keep_fields_separate() {
        let records = MemoryRecords::new();

        records
            .update_record("subscriptions", "doc1", "email", true)
            .await
            .unwrap();
        records
            .update_record("subscriptions", "doc1", "phone", true)
            .await
            .unwrap();
        records
            .update_record("subscriptions", "doc2", "phone", false)
            .await
            .unwrap();

        assert_eq!(records.field("subscriptions", "doc1", "email").await, Some(true));
        assert_eq!(records.field("subscriptions", "doc1", "phone").await, Some(true));
        assert_eq!(records.field("subscriptions", "doc2", "phone").await, Some(false));
        assert_eq!(records.count().await, 2);
    }
}
