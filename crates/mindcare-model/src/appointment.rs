//! Appointments and bookable time slots

use crate::decode::{Collection, Record};
use crate::ids::{AppointmentId, ProfileId};
use crate::lifecycle::Lifecycle;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Appointment status
///
/// `pending -> confirmed | cancelled`, `confirmed -> completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Requested by the client, awaiting the practice
    Pending,
    /// Accepted by the practice
    Confirmed,
    /// Session took place
    Completed,
    /// Declined by the practice
    Cancelled,
}

impl AppointmentStatus {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Still occupies its slot on the calendar
    #[inline]
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }
}

impl Lifecycle for AppointmentStatus {
    const ENTITY: &'static str = "appointment";
    const ALL: &'static [Self] = &[
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];
    const INITIAL: Self = AppointmentStatus::Pending;

    fn allowed_transitions(self) -> &'static [Self] {
        use AppointmentStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Completed],
            Completed => &[],
            Cancelled => &[],
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown appointment status: {s}"))
    }
}

/// Half-hour booking slot
///
/// Only the morning block (09:00-11:30) and the afternoon block
/// (14:00-17:30) are bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    hour: u8,
    minute: u8,
}

impl TimeSlot {
    /// Every bookable slot, in day order
    pub const ALL: [TimeSlot; 14] = [
        TimeSlot::at(9, 0),
        TimeSlot::at(9, 30),
        TimeSlot::at(10, 0),
        TimeSlot::at(10, 30),
        TimeSlot::at(11, 0),
        TimeSlot::at(11, 30),
        TimeSlot::at(14, 0),
        TimeSlot::at(14, 30),
        TimeSlot::at(15, 0),
        TimeSlot::at(15, 30),
        TimeSlot::at(16, 0),
        TimeSlot::at(16, 30),
        TimeSlot::at(17, 0),
        TimeSlot::at(17, 30),
    ];

    const fn at(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Look up the slot starting at `hour:minute`
    #[must_use]
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        let candidate = Self::at(hour, minute);
        Self::ALL.contains(&candidate).then_some(candidate)
    }

    #[inline]
    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    #[must_use]
    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    /// Accepts `HH:MM`, and the `HH:MM:SS` form time columns come back in.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("not a bookable time slot: {s}");
        let mut parts = s.trim().split(':');

        let hour: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let minute: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        match parts.next() {
            None => {}
            Some(seconds) if seconds.parse::<u8>() == Ok(0) => {}
            Some(_) => return Err(invalid()),
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        TimeSlot::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(value: TimeSlot) -> Self {
        value.to_string()
    }
}

/// Appointment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub client_id: ProfileId,
    pub appointment_date: NaiveDate,
    pub appointment_time: TimeSlot,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Appointment {
    const COLLECTION: Collection = Collection::Appointments;

    fn key(&self) -> Uuid {
        self.id.0
    }
}

/// Client name and email embedded in admin listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContact {
    pub full_name: String,
    pub email: String,
}

/// Appointment joined with its owner's contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentWithClient {
    #[serde(flatten)]
    pub appointment: Appointment,
    /// Absent when the owning profile is not visible to the caller
    #[serde(rename = "profiles", default)]
    pub client: Option<ClientContact>,
}

impl Record for AppointmentWithClient {
    const COLLECTION: Collection = Collection::Appointments;

    fn key(&self) -> Uuid {
        self.appointment.id.0
    }
}

/// Booking request as inserted by a client
///
/// Always starts `pending`; the status is not settable by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAppointment {
    pub client_id: ProfileId,
    pub appointment_date: NaiveDate,
    pub appointment_time: TimeSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    status: AppointmentStatus,
}

impl NewAppointment {
    /// Create a pending booking
    #[must_use]
    pub fn new(
        client_id: ProfileId,
        appointment_date: NaiveDate,
        appointment_time: TimeSlot,
        notes: Option<String>,
    ) -> Self {
        Self {
            client_id,
            appointment_date,
            appointment_time,
            notes,
            status: AppointmentStatus::INITIAL,
        }
    }

    /// Status the booking is inserted with
    #[inline]
    #[must_use]
    pub fn status(&self) -> AppointmentStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_open_appointments_hold_a_slot() {
        let scheduled: Vec<_> = AppointmentStatus::ALL
            .iter()
            .copied()
            .filter(AppointmentStatus::is_scheduled)
            .collect();
        assert_eq!(scheduled, [AppointmentStatus::Pending, AppointmentStatus::Confirmed]);
    }

    #[test]
    fn time_slots_skip_lunch() {
        assert_eq!(TimeSlot::ALL.len(), 14);
        assert!(TimeSlot::new(12, 0).is_none());
        assert!(TimeSlot::new(13, 30).is_none());
        assert!(TimeSlot::new(9, 15).is_none());
        assert!(TimeSlot::new(17, 30).is_some());
    }

    #[test]
    fn time_slot_parses_column_format() {
        assert_eq!("09:00".parse::<TimeSlot>().unwrap(), TimeSlot::ALL[0]);
        assert_eq!("14:30:00".parse::<TimeSlot>().unwrap().to_string(), "14:30");
        assert!("14:30:15".parse::<TimeSlot>().is_err());
        assert!("18:00".parse::<TimeSlot>().is_err());
        assert!("nine".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn new_appointment_is_pending_without_blank_notes() {
        let booking = NewAppointment::new(
            ProfileId::new(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            TimeSlot::ALL[0],
            None,
        );
        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["appointment_time"], "09:00");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn appointment_with_client_decodes_embedded_profile() {
        let row = json!({
            "id": "0b7e8f1a-1111-4c3d-9e8f-0a1b2c3d4e5f",
            "client_id": "6f1c2d4e-8a9b-4c3d-9e8f-0a1b2c3d4e5f",
            "appointment_date": "2030-01-01",
            "appointment_time": "09:00:00",
            "status": "confirmed",
            "notes": null,
            "created_at": "2029-12-01T10:00:00Z",
            "updated_at": "2029-12-02T10:00:00Z",
            "profiles": { "full_name": "Ada Client", "email": "ada@example.com" }
        });

        let joined: AppointmentWithClient = serde_json::from_value(row).unwrap();
        assert_eq!(joined.appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(joined.client.unwrap().full_name, "Ada Client");
    }

    #[test]
    fn status_from_str() {
        assert_eq!("cancelled".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Cancelled);
        assert!("archived".parse::<AppointmentStatus>().is_err());
    }
}
