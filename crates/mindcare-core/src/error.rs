//! Portal error taxonomy
//!
//! Every failure a view can see falls in one of four buckets:
//! - authentication: the user must sign in again, with a message
//! - authorization: a silent redirect
//! - validation: per-field messages, raised before any network call
//! - remote: a transient notice; no local state changes
//!
//! None of them end the process.

use crate::config::ConfigError;
use crate::routes::Route;
use mindcare_gateway::GatewayError;
use mindcare_model::{TransitionError, ValidationErrors};
use thiserror::Error;

/// Errors surfaced to views
#[derive(Debug, Error)]
pub enum PortalError {
    /// No usable session; the user is sent to `redirect`
    #[error("authentication required: {message}")]
    Authentication {
        /// Shown alongside the login form
        message: String,
        /// Where the view should go
        redirect: Route,
    },

    /// Signed in but not allowed here
    #[error("not permitted; redirecting to {redirect}")]
    Authorization {
        /// Where the view should go
        redirect: Route,
    },

    /// Session still being established; the view waits
    #[error("session is still loading")]
    SessionLoading,

    /// Form input rejected before any network call
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Requested status change is not on the lifecycle table
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Gateway call failed
    #[error("remote error: {0}")]
    Remote(#[from] GatewayError),

    /// Portal misconfigured
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PortalError {
    /// Authentication failure redirecting to the login route
    #[must_use]
    pub fn sign_in_required(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            redirect: Route::Login,
        }
    }

    /// Check if the user can carry on from where they are
    ///
    /// Validation and remote failures leave the session intact, so the same
    /// action may be repeated.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Transition(_) | Self::SessionLoading => true,
            Self::Remote(err) => !err.is_auth_failure(),
            Self::Authentication { .. } | Self::Authorization { .. } | Self::Config(_) => false,
        }
    }

    /// Route the view should move to, if any
    #[must_use]
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::Authentication { redirect, .. } | Self::Authorization { redirect } => {
                Some(*redirect)
            }
            _ => None,
        }
    }

    /// Message for the transient notice; `None` for silent failures
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::Authorization { .. } | Self::SessionLoading => None,
            Self::Authentication { message, .. } => Some(message.clone()),
            Self::Validation(errors) => Some(errors.to_string()),
            Self::Transition(err) => Some(err.to_string()),
            Self::Remote(err) => Some(remote_notice(err)),
            Self::Config(err) => Some(err.to_string()),
        }
    }
}

fn remote_notice(err: &GatewayError) -> String {
    match err {
        GatewayError::InvalidCredentials => "Invalid email or password".to_string(),
        GatewayError::AlreadyRegistered(_) => "An account with this email already exists".to_string(),
        GatewayError::SessionExpired => "Your session has expired. Please sign in again".to_string(),
        GatewayError::PolicyViolation(_) => "You are not allowed to do that".to_string(),
        GatewayError::NotFound { .. } => "The requested record could not be found".to_string(),
        GatewayError::Network(_) => "Could not reach the server. Please try again".to_string(),
        other => format!("Something went wrong: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_is_silent() {
        let err = PortalError::Authorization {
            redirect: Route::Dashboard,
        };
        assert_eq!(err.notice(), None);
        assert_eq!(err.redirect(), Some(Route::Dashboard));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn expired_session_is_not_recoverable() {
        let err = PortalError::from(GatewayError::SessionExpired);
        assert!(!err.is_recoverable());

        let err = PortalError::from(GatewayError::Network("timed out".into()));
        assert!(err.is_recoverable());
        assert_eq!(err.notice().as_deref(), Some("Could not reach the server. Please try again"));
    }

    #[test]
    fn validation_notice_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("subject", "Subject must be at least 5 characters");
        let err = PortalError::from(errors);
        assert!(err.is_recoverable());
        assert!(err.notice().unwrap().contains("Subject must be at least 5 characters"));
    }
}
