//! Error types for the record model
//!
//! Three kinds of failure originate here:
//! - a gateway row that does not match the expected record shape
//! - a status change outside the lifecycle table
//! - form input rejected by a validation schema

use crate::decode::Collection;
use std::fmt;

/// Umbrella error for the model crate
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Row decoding failed
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Status change not permitted
    #[error("transition rejected: {0}")]
    Transition(#[from] TransitionError),

    /// Form input invalid
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

/// A gateway row could not be turned into a typed record
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Row shape did not match the record
    #[error("malformed {collection} row: {source}")]
    Malformed {
        /// Collection the row came from
        collection: Collection,
        /// Underlying serde failure
        #[source]
        source: serde_json::Error,
    },

    /// Gateway returned no row where one was expected
    #[error("no {0} row returned")]
    Missing(Collection),
}

impl DecodeError {
    /// Collection the failing row belongs to
    #[inline]
    #[must_use]
    pub fn collection(&self) -> Collection {
        match self {
            Self::Malformed { collection, .. } => *collection,
            Self::Missing(collection) => *collection,
        }
    }
}

/// Status change rejected by a lifecycle table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// `from -> to` is not an edge of the lifecycle
    #[error("{entity} cannot move from {from} to {to}")]
    Illegal {
        /// Record kind
        entity: &'static str,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// An admin response was attached to a non-resolving update
    #[error("admin response is only allowed when resolving")]
    ResponseWithoutResolution,
}

/// Single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name
    pub field: &'static str,
    /// Message shown next to the field
    pub message: String,
}

impl FieldError {
    /// Create new field error
    #[inline]
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors collected by one schema run
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create empty error set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Whether no field failed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All recorded failures, in field order
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First message recorded for `field`
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("subject", "too short");
        errors.add("message", "too short");

        assert_eq!(errors.to_string(), "subject: too short; message: too short");
        assert_eq!(errors.message_for("message"), Some("too short"));
        assert_eq!(errors.message_for("priority"), None);
    }

    #[test]
    fn finish_returns_value_when_clean() {
        let errors = ValidationErrors::new();
        assert_eq!(errors.finish(7).unwrap(), 7);
    }

    #[test]
    fn transition_error_display() {
        let err = TransitionError::Illegal {
            entity: "appointment",
            from: "confirmed".to_string(),
            to: "pending".to_string(),
        };
        assert_eq!(err.to_string(), "appointment cannot move from confirmed to pending");
    }
}
