//! Error types for record decoding.

use thiserror::Error;

/// Reasons a single entry's bytes do not decode into a [`crate::Record`].
#[derive(Error, Debug)]
pub enum MalformedRecordError {
    #[error("Entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field '{field}' must be a scalar, got {kind}")]
    InvalidField { field: &'static str, kind: &'static str },
}

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, MalformedRecordError>;
