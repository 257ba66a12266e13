//! Form schemas
//!
//! Each form holds the raw strings a user typed. Parsing either yields the
//! typed payload for the gateway or every field error at once, before any
//! network call is made.

use crate::appointment::{NewAppointment, TimeSlot};
use crate::consultation::{NewConsultation, Priority};
use crate::error::ValidationErrors;
use crate::ids::ProfileId;
use crate::profile::ProfileUpdate;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum characters in a display name
pub const MIN_NAME_LEN: usize = 2;
/// Minimum characters in a password
pub const MIN_PASSWORD_LEN: usize = 6;
/// Minimum characters in a consultation subject
pub const MIN_SUBJECT_LEN: usize = 5;
/// Minimum characters in a consultation message
pub const MIN_MESSAGE_LEN: usize = 20;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if !EMAIL_RE.is_match(email.trim()) {
        errors.add("email", "Please enter a valid email address");
    }
}

/// Sign-in form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.finish(())
    }
}

/// Sign-up form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if char_len(&self.full_name) < MIN_NAME_LEN {
            errors.add("full_name", "Full name must be at least 2 characters");
        }
        check_email(&mut errors, &self.email);
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add("password", "Password must be at least 6 characters");
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords don't match");
        }
        errors.finish(())
    }
}

/// Appointment booking form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingForm {
    /// `YYYY-MM-DD`
    pub appointment_date: String,
    /// One of [`TimeSlot::ALL`], as `HH:MM`
    pub appointment_time: String,
    pub notes: String,
}

impl BookingForm {
    /// Parse into a pending booking owned by `client_id`
    ///
    /// Dates before `today` are rejected.
    pub fn parse(
        &self,
        client_id: ProfileId,
        today: NaiveDate,
    ) -> Result<NewAppointment, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let date = if self.appointment_date.trim().is_empty() {
            errors.add("appointment_date", "Please select a date");
            None
        } else {
            match NaiveDate::parse_from_str(self.appointment_date.trim(), "%Y-%m-%d") {
                Ok(date) if date < today => {
                    errors.add("appointment_date", "Date cannot be in the past");
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("appointment_date", "Please select a valid date");
                    None
                }
            }
        };

        let slot = if self.appointment_time.trim().is_empty() {
            errors.add("appointment_time", "Please select a time");
            None
        } else {
            match self.appointment_time.parse::<TimeSlot>() {
                Ok(slot) => Some(slot),
                Err(_) => {
                    errors.add("appointment_time", "Please select an available time slot");
                    None
                }
            }
        };

        match (date, slot) {
            (Some(date), Some(slot)) if errors.is_empty() => Ok(NewAppointment::new(
                client_id,
                date,
                slot,
                optional(&self.notes),
            )),
            _ => Err(errors),
        }
    }
}

/// Consultation request form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationForm {
    pub subject: String,
    pub message: String,
    pub priority: Priority,
}

impl Default for ConsultationForm {
    fn default() -> Self {
        Self {
            subject: String::new(),
            message: String::new(),
            priority: Priority::default(),
        }
    }
}

impl ConsultationForm {
    /// Parse into a pending request owned by `client_id`
    pub fn parse(&self, client_id: ProfileId) -> Result<NewConsultation, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if char_len(&self.subject) < MIN_SUBJECT_LEN {
            errors.add("subject", "Subject must be at least 5 characters");
        }
        if char_len(&self.message) < MIN_MESSAGE_LEN {
            errors.add("message", "Message must be at least 20 characters");
        }
        errors.finish(())?;

        Ok(NewConsultation::new(
            client_id,
            self.subject.trim(),
            self.message.trim(),
            self.priority,
        ))
    }
}

/// Profile editor form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: String,
    /// `YYYY-MM-DD` or blank
    pub date_of_birth: String,
    pub emergency_contact: String,
    pub medical_history: String,
}

impl ProfileForm {
    /// Pre-fill the form from a stored profile
    #[must_use]
    pub fn from_profile(profile: &crate::profile::Profile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            date_of_birth: profile
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            emergency_contact: profile.emergency_contact.clone().unwrap_or_default(),
            medical_history: profile.medical_history.clone().unwrap_or_default(),
        }
    }

    /// Parse into an owner update; blank optional fields clear the column
    pub fn parse(&self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if char_len(&self.full_name) < MIN_NAME_LEN {
            errors.add("full_name", "Full name must be at least 2 characters");
        }

        let date_of_birth = match optional(&self.date_of_birth) {
            None => None,
            Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("date_of_birth", "Please enter a valid date");
                    None
                }
            },
        };
        errors.finish(())?;

        Ok(ProfileUpdate {
            full_name: self.full_name.trim().to_string(),
            phone: optional(&self.phone),
            date_of_birth,
            emergency_contact: optional(&self.emergency_contact),
            medical_history: optional(&self.medical_history),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::AppointmentStatus;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn booking_with_blank_notes_has_no_notes() {
        let client = ProfileId::new();
        let form = BookingForm {
            appointment_date: "2030-01-01".to_string(),
            appointment_time: "09:00".to_string(),
            notes: String::new(),
        };

        let booking = form.parse(client, today()).unwrap();
        assert_eq!(booking.client_id, client);
        assert_eq!(booking.notes, None);
        assert_eq!(booking.status(), AppointmentStatus::Pending);
    }

    #[test]
    fn booking_reports_every_missing_field() {
        let errors = BookingForm::default()
            .parse(ProfileId::new(), today())
            .unwrap_err();
        assert_eq!(errors.message_for("appointment_date"), Some("Please select a date"));
        assert_eq!(errors.message_for("appointment_time"), Some("Please select a time"));
    }

    #[test]
    fn booking_rejects_past_dates_and_lunch_slots() {
        let form = BookingForm {
            appointment_date: "2020-01-01".to_string(),
            appointment_time: "12:30".to_string(),
            notes: String::new(),
        };
        let errors = form.parse(ProfileId::new(), today()).unwrap_err();
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn consultation_lengths() {
        let form = ConsultationForm {
            subject: "Hi".to_string(),
            message: "short".to_string(),
            priority: Priority::Urgent,
        };
        let errors = form.parse(ProfileId::new()).unwrap_err();
        assert!(errors.message_for("subject").is_some());
        assert!(errors.message_for("message").is_some());
    }

    #[test]
    fn registration_checks_confirmation() {
        let form = RegistrationForm {
            full_name: "Ada Client".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.message_for("confirm_password"), Some("Passwords don't match"));
    }

    #[test]
    fn login_requires_email_shape() {
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn profile_form_blank_fields_become_null() {
        let form = ProfileForm {
            full_name: "  Ada Client ".to_string(),
            phone: "   ".to_string(),
            date_of_birth: "1990-04-01".to_string(),
            emergency_contact: String::new(),
            medical_history: "Anxiety".to_string(),
        };
        let update = form.parse().unwrap();
        assert_eq!(update.full_name, "Ada Client");
        assert_eq!(update.phone, None);
        assert_eq!(update.medical_history.as_deref(), Some("Anxiety"));
        assert!(update.date_of_birth.is_some());
    }
}
