//! Firestore REST API types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A typed Firestore field value.
///
/// Serialized in the REST wire shape, e.g. `{"booleanValue": true}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    BooleanValue(bool),
    StringValue(String),
    /// Firestore transports 64-bit integers as decimal strings
    IntegerValue(String),
    DoubleValue(f64),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::BooleanValue(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::StringValue(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::IntegerValue(v.to_string())
    }
}

/// Request body of a document patch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentPatch {
    pub fields: HashMap<String, Value>,
}

impl DocumentPatch {
    /// Build a patch body holding a single field.
    pub fn with_field(field: impl Into<String>, value: Value) -> Self {
        let mut fields = HashMap::new();
        fields.insert(field.into(), value);
        Self { fields }
    }
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
