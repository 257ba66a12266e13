//! Admin appointment manager
//!
//! Lists every appointment with its client, filtered by status tab. The
//! actions offered for a row come straight from the appointment lifecycle.

use crate::error::PortalError;
use crate::portal::Portal;
use crate::reducer::{Confirmed, ListState};
use crate::routes::Access;
use mindcare_gateway::{GatewayExt, Order, Query};
use mindcare_model::{
    Appointment, AppointmentStatus, AppointmentWithClient, Lifecycle, StatusChange,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Confirmed,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Confirmed,
        StatusFilter::Completed,
    ];

    #[must_use]
    pub fn admits(&self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == AppointmentStatus::Pending,
            StatusFilter::Confirmed => status == AppointmentStatus::Confirmed,
            StatusFilter::Completed => status == AppointmentStatus::Completed,
        }
    }
}

/// Status action on one appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentAction {
    Confirm,
    Cancel,
    Complete,
}

impl AppointmentAction {
    /// Status the action moves to
    #[must_use]
    pub fn target(&self) -> AppointmentStatus {
        match self {
            AppointmentAction::Confirm => AppointmentStatus::Confirmed,
            AppointmentAction::Cancel => AppointmentStatus::Cancelled,
            AppointmentAction::Complete => AppointmentStatus::Completed,
        }
    }

    fn for_target(status: AppointmentStatus) -> Option<Self> {
        match status {
            AppointmentStatus::Confirmed => Some(AppointmentAction::Confirm),
            AppointmentStatus::Cancelled => Some(AppointmentAction::Cancel),
            AppointmentStatus::Completed => Some(AppointmentAction::Complete),
            AppointmentStatus::Pending => None,
        }
    }

    /// Actions offered for an appointment in `status`
    #[must_use]
    pub fn available(status: AppointmentStatus) -> Vec<Self> {
        status
            .allowed_transitions()
            .iter()
            .filter_map(|to| Self::for_target(*to))
            .collect()
    }

    #[must_use]
    pub fn notice(&self) -> &'static str {
        match self {
            AppointmentAction::Confirm => "Appointment confirmed",
            AppointmentAction::Cancel => "Appointment cancelled",
            AppointmentAction::Complete => "Appointment marked as completed",
        }
    }
}

impl fmt::Display for AppointmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AppointmentAction::Confirm => "confirm",
            AppointmentAction::Cancel => "cancel",
            AppointmentAction::Complete => "complete",
        })
    }
}

#[derive(Debug, Default)]
pub struct AdminAppointments {
    pub list: ListState<AppointmentWithClient>,
    pub filter: StatusFilter,
}

impl AdminAppointments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every appointment, soonest first
    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        let account = portal.admit(Access::Admin)?;
        let query = Query::all()
            .order(Order::asc("appointment_date"))
            .with_client();
        let rows = portal.remote(
            portal
                .gateway()
                .fetch::<AppointmentWithClient>(&account.session, &query)
                .await,
        )?;
        self.list.apply(Confirmed::Loaded(rows));
        Ok(())
    }

    /// Rows under the current tab
    #[must_use]
    pub fn visible(&self) -> Vec<&AppointmentWithClient> {
        self.list
            .items()
            .iter()
            .filter(|row| self.filter.admits(row.appointment.status))
            .collect()
    }

    /// Apply `action` to appointment `id`
    ///
    /// The transition is checked against the held row before the write; the
    /// list changes only once the gateway returns the stored row.
    pub async fn act(
        &mut self,
        portal: &Portal,
        id: Uuid,
        action: AppointmentAction,
    ) -> Result<Appointment, PortalError> {
        let account = portal.admit(Access::Admin)?;
        let current = match self.list.get(id) {
            Some(row) => row.appointment.status,
            None => {
                portal
                    .remote(
                        portal
                            .gateway()
                            .fetch_one::<Appointment>(&account.session, id)
                            .await,
                    )?
                    .status
            }
        };
        let change = StatusChange::checked(current, action.target())?;

        let updated = portal.remote(
            portal
                .gateway()
                .modify::<Appointment, _>(&account.session, id, &change)
                .await,
        )?;
        tracing::info!(appointment = %updated.id, %action, status = %updated.status, "appointment updated");
        self.list.apply(Confirmed::Updated(updated.clone()));
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_follow_lifecycle() {
        assert_eq!(
            AppointmentAction::available(AppointmentStatus::Pending),
            vec![AppointmentAction::Confirm, AppointmentAction::Cancel]
        );
        assert_eq!(
            AppointmentAction::available(AppointmentStatus::Confirmed),
            vec![AppointmentAction::Complete]
        );
        assert!(AppointmentAction::available(AppointmentStatus::Completed).is_empty());
        assert!(AppointmentAction::available(AppointmentStatus::Cancelled).is_empty());
    }

    #[test]
    fn tabs_filter_by_status() {
        assert!(StatusFilter::All.admits(AppointmentStatus::Cancelled));
        assert!(StatusFilter::Pending.admits(AppointmentStatus::Pending));
        assert!(!StatusFilter::Confirmed.admits(AppointmentStatus::Pending));
    }
}
