//! Confirmation token codec.
//!
//! A token binds `(doc_id, identifier, secret)` into one opaque string:
//! the three fields joined by [`DELIMITER`], then standard padded base64.
//! The codec only checks shape; every domain check happens during
//! verification.

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

/// Field separator inside the decoded token payload.
pub const DELIMITER: &str = "__";

/// Reasons a token cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is not valid base64")]
    Encoding,

    #[error("token payload is not valid UTF-8")]
    Utf8,

    #[error("token has {0} fields, expected 3")]
    Arity(usize),
}

/// Decoded confirmation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationToken {
    pub doc_id: String,
    pub identifier: String,
    pub secret: String,
}

impl ConfirmationToken {
    pub fn new(
        doc_id: impl Into<String>,
        identifier: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Encode to the transport form.
    pub fn encode(&self) -> String {
        encode(&self.doc_id, &self.identifier, &self.secret)
    }

    /// Decode from the transport form.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        decode(token)
    }
}

/// Encode the three token fields.
pub fn encode(doc_id: &str, identifier: &str, secret: &str) -> String {
    let payload = [doc_id, identifier, secret].join(DELIMITER);
    STANDARD.encode(payload.as_bytes())
}

/// Whether `value` can precede another field and still be split back out.
///
/// A value holding the delimiter, or ending in `_` (which merges with the
/// delimiter that follows it), decodes to different fields.
pub fn is_encodable_field(value: &str) -> bool {
    !value.contains(DELIMITER) && !value.ends_with('_')
}

/// Decode a token, failing unless it carries exactly three fields.
pub fn decode(token: &str) -> Result<ConfirmationToken, TokenError> {
    let bytes = STANDARD.decode(token).map_err(|_| TokenError::Encoding)?;
    let payload = String::from_utf8(bytes).map_err(|_| TokenError::Utf8)?;

    match payload.split(DELIMITER).collect::<Vec<_>>().as_slice() {
        [doc_id, identifier, secret] => Ok(ConfirmationToken::new(*doc_id, *identifier, *secret)),
        parts => Err(TokenError::Arity(parts.len())),
    }
}
