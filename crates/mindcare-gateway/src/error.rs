//! Gateway error types

use mindcare_model::{Collection, DecodeError};
use uuid::Uuid;

/// Failure reported by (or while talking to) the gateway
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Email/password pair rejected
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// Email already registered
    #[error("user already registered: {0}")]
    AlreadyRegistered(String),

    /// Access token expired or revoked
    #[error("session expired or invalid")]
    SessionExpired,

    /// Row-level policy refused the operation
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    /// Row does not exist or is not visible to the caller
    #[error("{collection} row {id} not found")]
    NotFound {
        /// Collection searched
        collection: Collection,
        /// Requested key
        id: Uuid,
    },

    /// Gateway rejected the request for another reason
    #[error("gateway rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: String,
    },

    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Row could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Payload could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted session file unreadable
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Gateway misconfigured
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Check if the caller's session is no longer usable
    #[inline]
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Check if the failure is transient and the operation may be repeated
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
            || matches!(self, Self::Rejected { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            GatewayError::Rejected {
                status: value.status().map_or(0, |s| s.as_u16()),
                message: value.to_string(),
            }
        } else {
            GatewayError::Network(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_classification() {
        assert!(GatewayError::SessionExpired.is_auth_failure());
        assert!(!GatewayError::InvalidCredentials.is_auth_failure());
        assert!(!GatewayError::PolicyViolation("x".into()).is_auth_failure());
    }

    #[test]
    fn retryable_classification() {
        assert!(GatewayError::Network("reset".into()).is_retryable());
        assert!(GatewayError::Rejected { status: 503, message: String::new() }.is_retryable());
        assert!(!GatewayError::Rejected { status: 400, message: String::new() }.is_retryable());
        assert!(!GatewayError::SessionExpired.is_retryable());
    }
}
