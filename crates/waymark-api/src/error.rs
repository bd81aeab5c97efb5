//! API error types.

use serde_json::Value;
use thiserror::Error;
use waymark_storage::StoreError;

/// Message used when a failure has no recognizable shape.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// API error type.
///
/// Every failure carries exactly one human-readable message (its `Display`
/// form); the underlying error object survives as a source or as the parsed
/// response body so the UI layer can show details.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The call exceeded its timeout budget
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        timeout_ms: u64,
        #[source]
        source: reqwest::Error,
    },

    /// The request never produced a response
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response; `message` is the normalized server error
    #[error("{message}")]
    Validation {
        message: String,
        status: u16,
        /// Parsed response body, kept for detailed display.
        body: Option<Value>,
    },

    /// A failure with no recognizable shape
    #[error("An unexpected error occurred")]
    Unexpected,

    /// Reading the bearer credential from the persistent store failed
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The request path could not be resolved against the base URL
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status code for validation failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_is_normalized_message() {
        let error = ApiError::Validation {
            message: "Email: Invalid".to_string(),
            status: 400,
            body: None,
        };
        assert_eq!(error.to_string(), "Email: Invalid");
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_unexpected_display() {
        assert_eq!(ApiError::Unexpected.to_string(), UNEXPECTED_ERROR);
    }
}
