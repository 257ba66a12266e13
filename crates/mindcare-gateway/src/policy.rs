//! Row-level access policy
//!
//! The rules every gateway deployment must enforce server-side:
//! - clients see and write only rows they own
//! - admins see every row and drive the status lifecycles
//! - nobody writes `role` or re-parents a row to another client
//! - status fields only move along their lifecycle edges
//!
//! [`crate::memory::InMemoryGateway`] runs these checks on every call.

use crate::error::GatewayError;
use mindcare_model::{
    validate_transition, AppointmentStatus, Collection, ConsultationStatus, Lifecycle,
    ProfileId, Role, TransitionError,
};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Identity a request runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: ProfileId,
    pub role: Role,
}

impl Caller {
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Columns no caller may write
const IMMUTABLE: &[&str] = &["id", "created_at", "role"];

/// Column holding the owning identity
#[must_use]
pub fn owner_column(collection: Collection) -> &'static str {
    match collection {
        Collection::Profiles => "id",
        Collection::Appointments | Collection::ConsultationRequests => "client_id",
    }
}

fn owner_of(collection: Collection, row: &Value) -> Option<ProfileId> {
    row.get(owner_column(collection))
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

fn violation(message: impl Into<String>) -> GatewayError {
    GatewayError::PolicyViolation(message.into())
}

fn parse_status<S>(value: &Value) -> Result<S, GatewayError>
where
    S: FromStr<Err = String>,
{
    value
        .as_str()
        .ok_or_else(|| violation("status must be a string"))?
        .parse()
        .map_err(violation)
}

fn transition_violation(err: TransitionError) -> GatewayError {
    violation(err.to_string())
}

/// Whether `caller` may read `row`
#[must_use]
pub fn can_view(caller: &Caller, collection: Collection, row: &Value) -> bool {
    caller.is_admin() || owner_of(collection, row) == Some(caller.id)
}

/// Check an insert before it is stored
pub fn check_insert(caller: &Caller, collection: Collection, row: &Value) -> Result<(), GatewayError> {
    let fields = row
        .as_object()
        .ok_or_else(|| violation("row must be an object"))?;

    if fields.contains_key("role") {
        return Err(violation("role is assigned by the gateway"));
    }
    if owner_of(collection, row) != Some(caller.id) {
        return Err(violation(format!(
            "{collection} rows may only be created for the caller"
        )));
    }

    match collection {
        Collection::Profiles => Ok(()),
        Collection::Appointments => {
            if let Some(status) = fields.get("status") {
                let status: AppointmentStatus = parse_status(status)?;
                if status != AppointmentStatus::INITIAL {
                    return Err(violation("appointments must be created pending"));
                }
            }
            Ok(())
        }
        Collection::ConsultationRequests => {
            if let Some(status) = fields.get("status") {
                let status: ConsultationStatus = parse_status(status)?;
                if status != ConsultationStatus::INITIAL {
                    return Err(violation("consultation requests must be created pending"));
                }
            }
            if fields.get("admin_response").is_some_and(|v| !v.is_null()) {
                return Err(violation("admin response cannot be set on creation"));
            }
            Ok(())
        }
    }
}

/// Check a patch against the currently stored row
pub fn check_update(
    caller: &Caller,
    collection: Collection,
    current: &Value,
    patch: &Value,
) -> Result<(), GatewayError> {
    let fields = patch
        .as_object()
        .ok_or_else(|| violation("patch must be an object"))?;

    if !can_view(caller, collection, current) {
        return Err(violation(format!("{collection} row belongs to another client")));
    }
    if let Some(column) = IMMUTABLE.iter().find(|c| fields.contains_key(**c)) {
        return Err(violation(format!("{column} cannot be changed")));
    }
    if let Some(owner) = fields.get("client_id") {
        if Some(owner) != current.get("client_id") {
            return Err(violation("client_id cannot be changed"));
        }
    }

    match collection {
        Collection::Profiles => Ok(()),
        Collection::Appointments => check_appointment_update(caller, current, fields),
        Collection::ConsultationRequests => check_consultation_update(caller, current, fields),
    }
}

fn check_appointment_update(
    caller: &Caller,
    current: &Value,
    fields: &Map<String, Value>,
) -> Result<(), GatewayError> {
    let Some(next) = fields.get("status") else {
        return Ok(());
    };
    if !caller.is_admin() {
        return Err(violation("only the practice may change appointment status"));
    }
    let from: AppointmentStatus = parse_status(current.get("status").unwrap_or(&Value::Null))?;
    let to: AppointmentStatus = parse_status(next)?;
    validate_transition(from, to).map_err(transition_violation)
}

fn check_consultation_update(
    caller: &Caller,
    current: &Value,
    fields: &Map<String, Value>,
) -> Result<(), GatewayError> {
    if fields.contains_key("priority") && fields.get("priority") != current.get("priority") {
        return Err(violation("priority cannot be changed"));
    }

    let administrative = fields.contains_key("status") || fields.contains_key("admin_response");
    if !administrative {
        return Ok(());
    }
    if !caller.is_admin() {
        return Err(violation("only the practice may triage consultation requests"));
    }

    let from: ConsultationStatus = parse_status(current.get("status").unwrap_or(&Value::Null))?;
    let to = match fields.get("status") {
        Some(next) => {
            let to: ConsultationStatus = parse_status(next)?;
            validate_transition(from, to).map_err(transition_violation)?;
            to
        }
        None => from,
    };

    let response = match fields.get("admin_response") {
        Some(value) => value,
        None => current.get("admin_response").unwrap_or(&Value::Null),
    };
    if !response.is_null() && to != ConsultationStatus::Resolved {
        return Err(transition_violation(TransitionError::ResponseWithoutResolution));
    }
    Ok(())
}
