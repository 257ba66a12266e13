//! Client dashboard: the caller's next appointments and latest requests

use crate::error::PortalError;
use crate::portal::Portal;
use crate::reducer::{Confirmed, ListState};
use crate::routes::Access;
use mindcare_gateway::{GatewayExt, Order, Query};
use mindcare_model::{Appointment, ConsultationRequest};

/// Rows shown per panel
pub const PANEL_LIMIT: usize = 5;

#[derive(Debug, Default)]
pub struct ClientDashboard {
    pub appointments: ListState<Appointment>,
    pub consultations: ListState<ConsultationRequest>,
}

impl ClientDashboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch both panels for the signed-in client
    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        let account = portal.admit(Access::Authenticated)?;
        let gateway = portal.gateway();

        let query = Query::all()
            .eq("client_id", account.id())
            .order(Order::asc("appointment_date"))
            .limit(PANEL_LIMIT);
        let appointments = portal.remote(gateway.fetch::<Appointment>(&account.session, &query).await)?;

        let query = Query::all()
            .eq("client_id", account.id())
            .order(Order::desc("created_at"))
            .limit(PANEL_LIMIT);
        let consultations =
            portal.remote(gateway.fetch::<ConsultationRequest>(&account.session, &query).await)?;

        self.appointments.apply(Confirmed::Loaded(appointments));
        self.consultations.apply(Confirmed::Loaded(consultations));
        Ok(())
    }
}
