//! Error types for ingestion, synthesis, encoding and service calls
//!
//! Degenerate-but-legal plot states are not errors; renderers report those as
//! [`crate::render::RenderSkip`] instead.

use std::time::Duration;

/// The main error type for biosig operations
#[derive(thiserror::Error, Debug)]
pub enum BiosigError {
    /// Malformed or missing input fields (ingestion, Doppler parameters)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network failure or non-2xx response from a backend service
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        /// HTTP status when the service answered at all
        status: Option<u16>,
        /// Human-readable failure description
        message: String,
    },

    /// A backend call did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Audio, file or payload decoding failure
    #[error("Decode error: {0}")]
    Decode(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BiosigError {
    /// Shorthand for a transport failure without an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        BiosigError::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Whether re-invoking the same operation may succeed.
    ///
    /// The core never retries on its own; front ends use this to offer a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BiosigError::Transport { .. } | BiosigError::Timeout(_))
    }
}

/// Result type for biosig operations
pub type Result<T> = std::result::Result<T, BiosigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_includes_status() {
        let err = BiosigError::Transport {
            status: Some(503),
            message: "service unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "Transport error (HTTP 503): service unavailable"
        );
        assert_eq!(
            BiosigError::transport("connection refused").to_string(),
            "Transport error: connection refused"
        );
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(BiosigError::transport("x").is_retryable());
        assert!(BiosigError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!BiosigError::Validation("x".into()).is_retryable());
        assert!(!BiosigError::Decode("x".into()).is_retryable());
    }
}
