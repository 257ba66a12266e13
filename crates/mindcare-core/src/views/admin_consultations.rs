//! Admin consultation triage

use crate::error::PortalError;
use crate::portal::Portal;
use crate::reducer::{Confirmed, ListState};
use crate::routes::Access;
use mindcare_gateway::{GatewayExt, Order, Query};
use mindcare_model::{ConsultationRequest, ConsultationUpdate, ConsultationWithClient, ValidationErrors};
use uuid::Uuid;

pub const RESPONDED_NOTICE: &str = "Response sent successfully";
pub const IN_PROGRESS_NOTICE: &str = "Status updated to in progress";

#[derive(Debug, Default)]
pub struct AdminConsultations {
    pub list: ListState<ConsultationWithClient>,
}

impl AdminConsultations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every request, newest first
    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        let account = portal.admit(Access::Admin)?;
        let query = Query::all().order(Order::desc("created_at")).with_client();
        let rows = portal.remote(
            portal
                .gateway()
                .fetch::<ConsultationWithClient>(&account.session, &query)
                .await,
        )?;
        self.list.apply(Confirmed::Loaded(rows));
        Ok(())
    }

    pub async fn mark_in_progress(
        &mut self,
        portal: &Portal,
        id: Uuid,
    ) -> Result<ConsultationRequest, PortalError> {
        self.update(portal, id, ConsultationUpdate::start()).await
    }

    /// Resolve a request with a response; status and text are written together
    pub async fn respond(
        &mut self,
        portal: &Portal,
        id: Uuid,
        response: &str,
    ) -> Result<ConsultationRequest, PortalError> {
        let response = response.trim();
        if response.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("admin_response", "Please enter a response");
            return Err(errors.into());
        }
        self.update(portal, id, ConsultationUpdate::resolve(Some(response.to_string())))
            .await
    }

    async fn update(
        &mut self,
        portal: &Portal,
        id: Uuid,
        update: ConsultationUpdate,
    ) -> Result<ConsultationRequest, PortalError> {
        let account = portal.admit(Access::Admin)?;
        let current = match self.list.get(id) {
            Some(row) => row.request.status,
            None => {
                portal
                    .remote(
                        portal
                            .gateway()
                            .fetch_one::<ConsultationRequest>(&account.session, id)
                            .await,
                    )?
                    .status
            }
        };
        update.check(current)?;

        let stored = portal.remote(
            portal
                .gateway()
                .modify::<ConsultationRequest, _>(&account.session, id, &update)
                .await,
        )?;
        tracing::info!(request = %stored.id, status = %stored.status, "consultation updated");
        self.list.apply(Confirmed::Updated(stored.clone()));
        Ok(stored)
    }
}
