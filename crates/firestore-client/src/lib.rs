//! Firestore document store client.

mod client;
mod error;
mod types;

pub use client::{FirestoreClient, DEFAULT_BASE_URL};
pub use error::FirestoreError;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOC_PATH: &str = "/v1/projects/demo/databases/(default)/documents/subscriptions/doc1";

    fn create_test_client(mock_server: &MockServer) -> FirestoreClient {
        FirestoreClient::new(mock_server.uri(), "demo", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_update_field_sends_mask_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .and(query_param("updateMask.fieldPaths", "email"))
            .and(query_param("mask.fieldPaths", "email"))
            .and(query_param("currentDocument.exists", "true"))
            .and(body_json(serde_json::json!({
                "fields": { "email": { "booleanValue": true } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/demo/databases/(default)/documents/subscriptions/doc1",
                "fields": { "email": { "booleanValue": true } },
                "updateTime": "2024-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .update_field("subscriptions", "doc1", "email", Value::from(true))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_succeeds_whatever_the_record_holds() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/demo/databases/(default)/documents/subscriptions/doc1",
                "fields": {
                    "email": { "booleanValue": true },
                    "createdAt": { "timestampValue": "2024-01-01T00:00:00Z" },
                    "location": { "geoPointValue": { "latitude": 35.6, "longitude": 139.7 } },
                    "note": { "nullValue": null },
                    "tags": { "arrayValue": { "values": [{ "stringValue": "tokyo" }] } },
                    "meta": { "mapValue": { "fields": {} } }
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .update_field("subscriptions", "doc1", "email", Value::from(true))
            .await;

        assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_update_with_empty_response_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .update_field("subscriptions", "doc1", "phone", Value::from(true))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).with_access_token("test-token");
        let result = client
            .update_field("subscriptions", "doc1", "phone", Value::from(false))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "code": 404, "message": "No document to update", "status": "NOT_FOUND" }
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .update_field("subscriptions", "doc1", "email", Value::from(true))
            .await;

        assert!(matches!(result, Err(FirestoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .update_field("subscriptions", "doc1", "phone", Value::from(true))
            .await;

        assert!(matches!(result, Err(FirestoreError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_api_error_message_extracted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": { "code": 503, "message": "The service is currently unavailable.", "status": "UNAVAILABLE" }
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .update_field("subscriptions", "doc1", "email", Value::from(true))
            .await;

        match result {
            Err(FirestoreError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "The service is currently unavailable.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_doc_id_is_path_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(
                "/v1/projects/demo/databases/(default)/documents/subscriptions/a%20b",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .update_field("subscriptions", "a b", "email", Value::from(true))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_value_serialization() {
        let json = serde_json::to_string(&Value::BooleanValue(true)).unwrap();
        assert_eq!(json, r#"{"booleanValue":true}"#);

        let json = serde_json::to_string(&Value::from(42i64)).unwrap();
        assert_eq!(json, r#"{"integerValue":"42"}"#);
    }
}
