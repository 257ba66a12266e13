//! MindCare Model - typed records for the portal
//!
//! Every row that crosses the gateway boundary is decoded into one of the
//! records defined here:
//! - [`Profile`] for the `profiles` collection
//! - [`Appointment`] for the `appointments` collection
//! - [`ConsultationRequest`] for the `consultation_requests` collection
//!
//! Status fields carry their own lifecycle tables (see [`lifecycle`]) and the
//! form schemas in [`validation`] run before any network call is made.
//!
//! # Example
//!
//! ```rust,ignore
//! use mindcare_model::{decode_row, Appointment, AppointmentStatus, Lifecycle};
//!
//! let appointment: Appointment = decode_row(row)?;
//! assert!(appointment.status.can_transition_to(AppointmentStatus::Confirmed));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod appointment;
pub mod consultation;
pub mod decode;
pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod profile;
pub mod validation;

pub use appointment::{
    Appointment, AppointmentStatus, AppointmentWithClient, ClientContact, NewAppointment,
    TimeSlot,
};
pub use consultation::{
    ConsultationRequest, ConsultationStatus, ConsultationUpdate, ConsultationWithClient,
    NewConsultation, Priority,
};
pub use decode::{decode_row, decode_rows, Collection, Record};
pub use error::{DecodeError, FieldError, ModelError, TransitionError, ValidationErrors};
pub use ids::{AppointmentId, ConsultationId, ProfileId};
pub use lifecycle::{validate_transition, Lifecycle, StatusChange};
pub use profile::{NewProfile, Profile, ProfileUpdate, Role};
pub use validation::{BookingForm, ConsultationForm, LoginForm, ProfileForm, RegistrationForm};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
