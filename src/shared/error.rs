//! Shared Error Types
//!
//! Errors raised while turning request bodies into the data model: a point
//! without an id, a settings patch with a mistyped field, an imported
//! project whose schema is not a list. They do not depend on the HTTP layer,
//! so both the repository and the handlers can produce them.
//!
//! # Usage
//!
//! ```rust
//! use plancollab::shared::error::SharedError;
//!
//! let error = SharedError::validation("properties.id", "point id is required");
//! assert_eq!(error.field(), "properties.id");
//! ```
use thiserror::Error;

/// Wire data that does not have the expected shape
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// A field is missing or has the wrong JSON type
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// Path of the offending field, e.g. `properties.id`
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Path of the field that failed validation
    pub fn field(&self) -> &str {
        match self {
            Self::ValidationError { field, .. } => field,
        }
    }
}
