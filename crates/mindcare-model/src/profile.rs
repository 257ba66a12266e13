//! Profiles and roles

use crate::decode::{Collection, Record};
use crate::ids::ProfileId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Portal role, assigned by the gateway when the profile is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Practice client
    Client,
    /// Practice staff
    Admin,
}

impl Role {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }

    /// Check if this role may use the admin console
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Equal to the authentication identity
    pub id: ProfileId,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Check if this profile holds `role`
    #[inline]
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

impl Record for Profile {
    const COLLECTION: Collection = Collection::Profiles;

    fn key(&self) -> Uuid {
        self.id.0
    }
}

/// Row inserted right after sign-up
///
/// Carries no role; the gateway assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub id: ProfileId,
    pub email: String,
    pub full_name: String,
}

/// Owner-initiated profile update
///
/// Unknown fields are rejected on deserialization, so a payload smuggling a
/// `role` never reaches the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_update_rejects_role_field() {
        let payload = json!({ "full_name": "Ada", "role": "admin" });
        let result: Result<ProfileUpdate, _> = serde_json::from_value(payload);
        assert!(result.is_err());
    }

    #[test]
    fn profile_update_serializes_without_role() {
        let update = ProfileUpdate {
            full_name: "Ada".to_string(),
            phone: Some("555-0100".to_string()),
            date_of_birth: None,
            emergency_contact: None,
            medical_history: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("role").is_none());
        assert_eq!(value["phone"], "555-0100");
        assert!(value["medical_history"].is_null());
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
        assert!(Role::Admin.is_admin());
        assert!(!Role::Client.is_admin());
        assert_eq!(Role::default(), Role::Client);
    }
}
