/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * ## Access Errors
 *
 * - `Forbidden` - a share token that does not resolve to an accessible file.
 *   An invalid or expired token looks exactly like an unauthorized one, so
 *   the caller never learns which it was.
 * - `Unauthorized` - the caller or the editor failed authentication
 *
 * ## Protocol Errors
 *
 * - `UnrecognizedCommand` - no registered handler claimed the command
 * - `SaveLocked` - another session is saving the document
 *
 * ## Server Errors
 *
 * - `StorageError` - the storage backend failed; never reported as `Forbidden`
 * - `StateError` - session bookkeeping failed
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// Every variant maps to one HTTP status and one stable `kind` string so
/// clients can tell failures apart.
///
/// # Usage
///
/// ```rust
/// use xfdocs::backend::error::BackendError;
///
/// let err = BackendError::forbidden("Failed to get document");
/// let err = BackendError::unrecognized_command("cursor");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Access to the requested resource is denied
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Authentication failed
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// No registered handler claimed the command
    #[error("Unrecognized command: {command_type}")]
    UnrecognizedCommand {
        /// The discriminator nobody claimed
        command_type: String,
    },

    /// The document save lock is held by another session
    #[error("Document {doc_id} is locked for saving by another session")]
    SaveLocked {
        /// The locked document
        doc_id: i64,
    },

    /// Request-level failure with its own status (bad format, unknown session)
    #[error("{message}")]
    HandlerError { status: StatusCode, message: String },

    /// State management error
    #[error("State error: {message}")]
    StateError { message: String },

    /// Storage backend failure
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// Unusable command payload
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a new unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a new unrecognized command error
    pub fn unrecognized_command(command_type: impl Into<String>) -> Self {
        Self::UnrecognizedCommand {
            command_type: command_type.into(),
        }
    }

    /// Create a new handler error with a status code
    ///
    /// # Example
    ///
    /// ```rust
    /// use xfdocs::backend::error::BackendError;
    /// use axum::http::StatusCode;
    ///
    /// let err = BackendError::handler(StatusCode::NOT_FOUND, "Unknown session");
    /// ```
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Forbidden` - 403
    /// - `Unauthorized` - 401
    /// - `UnrecognizedCommand` - 400
    /// - `SaveLocked` - 409
    /// - `HandlerError` - Uses the status code from the error
    /// - `StateError`, `StorageError`, `SerializationError` - 500
    /// - `SharedError` - 400
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::UnrecognizedCommand { .. } => StatusCode::BAD_REQUEST,
            Self::SaveLocked { .. } => StatusCode::CONFLICT,
            Self::HandlerError { status, .. } => *status,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Forbidden { .. } => "forbidden",
            Self::Unauthorized { .. } => "unauthorized",
            Self::UnrecognizedCommand { .. } => "unrecognized_command",
            Self::SaveLocked { .. } => "save_locked",
            Self::HandlerError { .. } => "request",
            Self::StateError { .. } => "state",
            Self::StorageError(_) => "storage",
            Self::SharedError(_) => "invalid_payload",
            Self::SerializationError(_) => "serialization",
        }
    }

    /// Get the error message
    ///
    /// Server-side failures are reported generically; the detail is logged
    /// where the error is raised.
    pub fn message(&self) -> String {
        match self {
            Self::Forbidden { message } => message.clone(),
            Self::Unauthorized { message } => message.clone(),
            Self::HandlerError { message, .. } => message.clone(),
            Self::StorageError(_) => "Storage backend unavailable".to_string(),
            Self::StateError { .. } | Self::SerializationError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}
