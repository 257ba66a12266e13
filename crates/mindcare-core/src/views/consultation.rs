//! Consultation request submission

use crate::error::PortalError;
use crate::portal::Portal;
use crate::routes::Access;
use mindcare_gateway::GatewayExt;
use mindcare_model::{ConsultationForm, ConsultationRequest};

pub const SUBMITTED_NOTICE: &str = "Consultation request submitted! We'll get back to you soon.";

/// Validate `form` and submit it as a pending request
pub async fn submit(portal: &Portal, form: &ConsultationForm) -> Result<ConsultationRequest, PortalError> {
    let account = portal.admit(Access::Authenticated)?;
    let request = form.parse(account.id())?;

    let stored = portal.remote(
        portal
            .gateway()
            .create::<ConsultationRequest, _>(&account.session, &request)
            .await,
    )?;
    tracing::info!(request = %stored.id, priority = %stored.priority, "consultation submitted");
    Ok(stored)
}
