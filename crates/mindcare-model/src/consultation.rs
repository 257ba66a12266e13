//! Consultation requests
//!
//! A client opens a request with a fixed priority; only the practice moves
//! it along `pending -> in_progress -> resolved` (or straight to
//! `resolved`). The admin response is written together with the resolving
//! status and never before.

use crate::appointment::ClientContact;
use crate::decode::{Collection, Record};
use crate::error::TransitionError;
use crate::ids::{ConsultationId, ProfileId};
use crate::lifecycle::{validate_transition, Lifecycle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Client-chosen urgency, immutable after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Every priority, least urgent first
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Label shown next to the choice on the request form
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low - General question or concern",
            Priority::Medium => "Medium - Moderate concern",
            Priority::High => "High - Significant concern",
            Priority::Urgent => "Urgent - Immediate attention needed",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown priority: {s}"))
    }
}

/// Consultation request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ConsultationStatus {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationStatus::Pending => "pending",
            ConsultationStatus::InProgress => "in_progress",
            ConsultationStatus::Resolved => "resolved",
        }
    }
}

impl Lifecycle for ConsultationStatus {
    const ENTITY: &'static str = "consultation request";
    const ALL: &'static [Self] = &[
        ConsultationStatus::Pending,
        ConsultationStatus::InProgress,
        ConsultationStatus::Resolved,
    ];
    const INITIAL: Self = ConsultationStatus::Pending;

    fn allowed_transitions(self) -> &'static [Self] {
        use ConsultationStatus::*;
        match self {
            Pending => &[InProgress, Resolved],
            InProgress => &[Resolved],
            Resolved => &[],
        }
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsultationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown consultation status: {s}"))
    }
}

/// Consultation request record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationRequest {
    pub id: ConsultationId,
    pub client_id: ProfileId,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
    pub status: ConsultationStatus,
    #[serde(default)]
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConsultationRequest {
    /// Check the status/response pairing
    ///
    /// A response may only be present once the request is resolved.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.admin_response.is_none() || self.status == ConsultationStatus::Resolved
    }
}

impl Record for ConsultationRequest {
    const COLLECTION: Collection = Collection::ConsultationRequests;

    fn key(&self) -> Uuid {
        self.id.0
    }
}

/// Consultation request joined with its owner's contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationWithClient {
    #[serde(flatten)]
    pub request: ConsultationRequest,
    #[serde(rename = "profiles", default)]
    pub client: Option<ClientContact>,
}

impl Record for ConsultationWithClient {
    const COLLECTION: Collection = Collection::ConsultationRequests;

    fn key(&self) -> Uuid {
        self.request.id.0
    }
}

/// Request as inserted by a client; always `pending`, never with a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewConsultation {
    pub client_id: ProfileId,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
    status: ConsultationStatus,
}

impl NewConsultation {
    /// Create a pending request
    #[must_use]
    pub fn new(
        client_id: ProfileId,
        subject: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            client_id,
            subject: subject.into(),
            message: message.into(),
            priority,
            status: ConsultationStatus::INITIAL,
        }
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> ConsultationStatus {
        self.status
    }
}

/// Administrative update of a request
///
/// Status and response travel in one payload so they are persisted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationUpdate {
    pub status: ConsultationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_response: Option<String>,
}

impl ConsultationUpdate {
    /// Move a request into `in_progress`
    #[must_use]
    pub fn start() -> Self {
        Self {
            status: ConsultationStatus::InProgress,
            admin_response: None,
        }
    }

    /// Resolve a request, optionally with a response
    #[must_use]
    pub fn resolve(response: Option<String>) -> Self {
        Self {
            status: ConsultationStatus::Resolved,
            admin_response: response,
        }
    }

    /// Check this update against the current status
    pub fn check(&self, from: ConsultationStatus) -> Result<(), TransitionError> {
        if self.admin_response.is_some() && self.status != ConsultationStatus::Resolved {
            return Err(TransitionError::ResponseWithoutResolution);
        }
        validate_transition(from, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rejects_response_without_resolution() {
        let update = ConsultationUpdate {
            status: ConsultationStatus::InProgress,
            admin_response: Some("hello".to_string()),
        };
        assert_eq!(
            update.check(ConsultationStatus::Pending),
            Err(TransitionError::ResponseWithoutResolution)
        );
    }

    #[test]
    fn pending_may_resolve_directly() {
        let update = ConsultationUpdate::resolve(Some("Call us on Monday".to_string()));
        assert!(update.check(ConsultationStatus::Pending).is_ok());
        assert!(update.check(ConsultationStatus::InProgress).is_ok());
        assert!(update.check(ConsultationStatus::Resolved).is_err());
    }

    #[test]
    fn start_only_from_pending() {
        assert!(ConsultationUpdate::start().check(ConsultationStatus::Pending).is_ok());
        assert!(ConsultationUpdate::start().check(ConsultationStatus::InProgress).is_err());
    }

    #[test]
    fn new_consultation_serializes_pending() {
        let request = NewConsultation::new(ProfileId::new(), "Sleep", "x".repeat(20), Priority::Urgent);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["priority"], "urgent");
        assert!(value.get("admin_response").is_none());
    }

    #[test]
    fn priority_ordering_and_default() {
        assert!(Priority::Urgent > Priority::High);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
    }
}
