//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required field is missing or malformed in the caller's input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A user or asset does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An external provider call failed. Carries the upstream HTTP status
    /// when one was received and whatever diagnostic detail the provider
    /// returned.
    #[error("upstream provider error: {detail}")]
    Upstream {
        /// HTTP status returned by the provider, if the request got that far.
        status: Option<u16>,
        /// Upstream response body or transport error description.
        detail: String,
    },

    /// A persistence or I/O error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for an upstream error with no HTTP status (transport
    /// failures, missing fields in an otherwise successful response).
    #[must_use]
    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_includes_detail() {
        let err = DomainError::Upstream {
            status: Some(503),
            detail: "service unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "upstream provider error: service unavailable"
        );
    }

    #[test]
    fn test_upstream_shorthand_has_no_status() {
        let DomainError::Upstream { status, detail } = DomainError::upstream("boom") else {
            panic!("expected Upstream");
        };
        assert_eq!(status, None);
        assert_eq!(detail, "boom");
    }
}
