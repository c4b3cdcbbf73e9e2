/**
 * Backend Error Types
 *
 * This module defines the error type returned by HTTP handlers. It wraps the
 * repository and wire-data errors and knows which HTTP status each maps to.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Raised directly by handlers: malformed JSON bodies, missing fields.
 *
 * ## Repository Errors
 *
 * Raised by the store layer. Store failures and rolled-back transactions are
 * server errors; an empty settings patch or a malformed imported feature is
 * the caller's fault.
 */

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::project::db::RepositoryError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use plancollab::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "planDataUrl is required");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g. missing field, unparsable body)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Error raised by the project repository
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Wire data failed validation
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Repository` - 400 for an empty patch or malformed import data, 500 otherwise
    /// - `SharedError` - 400 Bad Request
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Repository(err) => match err {
                RepositoryError::EmptySettings
                | RepositoryError::InvalidProject(_)
                | RepositoryError::InvalidFeature { .. } => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::Serialization(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Repository(err) => err.to_string(),
            Self::SharedError(err) => err.to_string(),
        }
    }
}

impl From<JsonRejection> for BackendError {
    /// Oversized bodies keep axum's 413; every other unreadable body is a 400
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::handler(status, rejection.body_text())
    }
}
