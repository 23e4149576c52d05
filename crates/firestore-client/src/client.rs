//! Firestore REST client implementation.

use crate::error::FirestoreError;
use crate::types::*;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Public Firestore endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

const DEFAULT_DATABASE: &str = "(default)";

/// Client for the Firestore document REST API.
///
/// Only patching individual fields of existing documents is implemented. The bearer token is kept in a `SecretString`.
#[derive(Clone)]
pub struct FirestoreClient {
    client: Client,
    base_url: String,
    project_id: String,
    database: String,
    access_token: Option<SecretString>,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FirestoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
            access_token: None,
        })
    }

    /// Attach an OAuth2 bearer token to every request.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::new(token.into()));
        self
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}/{}",
            self.base_url,
            self.project_id,
            self.database,
            encode(collection),
            encode(doc_id)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Set a single field on an existing document, leaving other fields intact.
    ///
    /// Uses an update mask so only `field` is written. The document must
    /// already exist; Firestore answers 404 otherwise because of the
    /// `currentDocument.exists` precondition.
    ///
    /// Success is decided by the status code alone. The returned document is
    /// never decoded, since it carries every field of the record and those
    /// may hold any Firestore value type.
    #[instrument(skip(self, value))]
    pub async fn update_field(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), FirestoreError> {
        let body = DocumentPatch::with_field(field, value);

        let request = self
            .client
            .patch(self.document_url(collection, doc_id))
            .query(&[
                ("updateMask.fieldPaths", field),
                ("currentDocument.exists", "true"),
                ("mask.fieldPaths", field),
            ])
            .json(&body);

        debug!(collection, doc_id, field, "Patching document field");

        let response = self.authorize(request).send().await?;
        check_status(response, collection, doc_id).await?;

        debug!(collection, doc_id, field, "Document field updated");
        Ok(())
    }
}

async fn check_status(
    response: Response,
    collection: &str,
    doc_id: &str,
) -> Result<Response, FirestoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(%status, collection, doc_id, "Firestore request failed");

    match status {
        StatusCode::NOT_FOUND => Err(FirestoreError::NotFound(format!(
            "{}/{}",
            collection, doc_id
        ))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FirestoreError::Unauthorized),
        _ => {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            Err(FirestoreError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
