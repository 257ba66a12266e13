//! Authentication types

use chrono::{DateTime, Duration, Utc};
use mindcare_model::ProfileId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Email/password pair, with metadata attached at sign-up
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<UserMetadata>,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            data: None,
        }
    }

    /// Attach the display name stored with the auth identity
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.data = Some(UserMetadata {
            full_name: Some(full_name.into()),
        });
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Free-form data kept with the auth identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Raw authentication identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: ProfileId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "user_metadata")]
    pub metadata: UserMetadata,
}

impl AuthUser {
    #[must_use]
    pub fn new(id: ProfileId, email: Option<String>) -> Self {
        Self {
            id,
            email,
            metadata: UserMetadata::default(),
        }
    }

    /// Name for a profile created on this identity's behalf
    ///
    /// Falls back to the local part of the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.metadata.full_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("Client")
            .to_string()
    }
}

/// Live authenticated session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// Create a session valid for `ttl` from now
    #[must_use]
    pub fn new(access_token: impl Into<String>, user: AuthUser, ttl: Duration) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: Utc::now() + ttl,
            user,
        }
    }

    /// Identity the session belongs to
    #[inline]
    #[must_use]
    pub fn user_id(&self) -> ProfileId {
        self.user.id
    }

    /// Check expiry against `now`
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Result of a sign-up
///
/// The gateway may hold the session back until the email is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUp {
    pub user: AuthUser,
    pub session: Option<Session>,
}
