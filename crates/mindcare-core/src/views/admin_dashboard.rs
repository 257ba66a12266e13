//! Admin dashboard counters

use crate::error::PortalError;
use crate::portal::Portal;
use crate::routes::Access;
use chrono::NaiveDate;
use mindcare_gateway::Filter;
use mindcare_model::{AppointmentStatus, Collection, ConsultationStatus, Lifecycle, Role};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_clients: u64,
    pub pending_appointments: u64,
    pub pending_consultations: u64,
    /// Pending or confirmed appointments on `today`
    pub todays_appointments: u64,
}

impl AdminStats {
    pub async fn load(portal: &Portal, today: NaiveDate) -> Result<Self, PortalError> {
        let account = portal.admit(Access::Admin)?;
        let session = &account.session;
        let gateway = portal.gateway();

        let total_clients = portal.remote(
            gateway
                .count(session, Collection::Profiles, &[Filter::eq("role", Role::Client)])
                .await,
        )?;
        let pending_appointments = portal.remote(
            gateway
                .count(
                    session,
                    Collection::Appointments,
                    &[Filter::eq("status", AppointmentStatus::Pending)],
                )
                .await,
        )?;
        let pending_consultations = portal.remote(
            gateway
                .count(
                    session,
                    Collection::ConsultationRequests,
                    &[Filter::eq("status", ConsultationStatus::Pending)],
                )
                .await,
        )?;
        let todays_appointments = portal.remote(
            gateway
                .count(
                    session,
                    Collection::Appointments,
                    &[
                        Filter::eq("appointment_date", today),
                        Filter::any_of(
                            "status",
                            AppointmentStatus::ALL.iter().filter(|s| s.is_scheduled()),
                        ),
                    ],
                )
                .await,
        )?;

        Ok(Self {
            total_clients,
            pending_appointments,
            pending_consultations,
            todays_appointments,
        })
    }
}
