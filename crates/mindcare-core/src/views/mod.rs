//! Portal views
//!
//! Each view runs the same cycle: guard check, reads scoped to the caller
//! (or unscoped for admin views), then a write whose confirmed result is
//! folded into the view's list state.

pub mod admin_appointments;
pub mod admin_clients;
pub mod admin_consultations;
pub mod admin_dashboard;
pub mod booking;
pub mod client_dashboard;
pub mod consultation;
pub mod profile;

pub use admin_appointments::{AdminAppointments, AppointmentAction, StatusFilter};
pub use admin_clients::AdminClients;
pub use admin_consultations::AdminConsultations;
pub use admin_dashboard::AdminStats;
pub use client_dashboard::ClientDashboard;
pub use profile::ProfileEditor;
