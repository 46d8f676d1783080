//! Errors raised while reading editor messages.
//!
//! They carry no HTTP semantics; the backend renders all of them as 400.

use thiserror::Error;

/// A command message the gateway cannot act on
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// The body is not a JSON command object
    #[error("malformed message: {reason}")]
    MalformedMessage { reason: String },

    /// A payload field has the wrong shape
    #[error("field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// The message names a document other than the session's
    #[error("message is for document {requested}, session is on document {session}")]
    DocumentMismatch { requested: String, session: i64 },
}

impl SharedError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMessage {
            reason: err.to_string(),
        }
    }
}
