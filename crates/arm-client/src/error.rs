//! Azure Resource Manager client errors
//!
//! Every failure coming back from the provider is surfaced as an [`ArmError`].
//! Callers never look at status codes directly; they ask [`classify_error`]
//! (or [`ArmError::kind`]) which bucket an error falls into.

use thiserror::Error;

/// Errors that can occur when interacting with the Resource Manager API
#[derive(Debug, Error)]
pub enum ArmError {
    /// HTTP transport error (connection refused, TLS, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource Manager returned a non-success status
    #[error("{message}: StatusCode={status}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Error code from the response body, if any (e.g. "ResourceNotFound")
        code: Option<String>,
        /// Human-readable message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A long-running operation reached a terminal state other than success
    #[error("operation {operation} finished with status {status}")]
    Operation {
        /// Operation URL that was polled
        operation: String,
        /// Terminal status reported by the provider
        status: String,
    },

    /// Invalid request (e.g., malformed resource ID)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Provider error classification.
///
/// Only [`ErrorKind::NotFound`] changes reconciliation behavior; every other
/// kind is fatal for the current pass and exists for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// HTTP 404
    NotFound,
    /// HTTP 401 / 403
    Unauthorized,
    /// HTTP 409
    Conflict,
    /// HTTP 429
    Throttled,
    /// HTTP 5xx
    Server,
    /// Any other status, transport or decoding failure
    Other,
}

impl ArmError {
    /// Build an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Shorthand for a 404 API error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::api(404, message)
    }

    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        classify_error(self)
    }

    /// True when the provider reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Classify a provider error by its HTTP status.
pub fn classify_error(err: &ArmError) -> ErrorKind {
    match err.status() {
        Some(404) => ErrorKind::NotFound,
        Some(401 | 403) => ErrorKind::Unauthorized,
        Some(409) => ErrorKind::Conflict,
        Some(429) => ErrorKind::Throttled,
        Some(500..=599) => ErrorKind::Server,
        _ => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_status() {
        assert_eq!(classify_error(&ArmError::not_found("Not found")), ErrorKind::NotFound);
        assert_eq!(classify_error(&ArmError::api(403, "Forbidden")), ErrorKind::Unauthorized);
        assert_eq!(classify_error(&ArmError::api(429, "Too Many Requests")), ErrorKind::Throttled);
        assert_eq!(classify_error(&ArmError::api(500, "Internal Server Error")), ErrorKind::Server);
        assert_eq!(
            classify_error(&ArmError::InvalidRequest("bad id".to_string())),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ArmError::api(500, "Internal Server Error");
        assert_eq!(err.to_string(), "Internal Server Error: StatusCode=500");
        assert!(!err.is_not_found());
        assert!(ArmError::not_found("Not found").is_not_found());
    }
}
