//! Appointment booking

use crate::error::PortalError;
use crate::portal::Portal;
use crate::routes::Access;
use chrono::NaiveDate;
use mindcare_gateway::GatewayExt;
use mindcare_model::{Appointment, BookingForm, TimeSlot};

pub const BOOKED_NOTICE: &str = "Appointment booked successfully! We'll confirm it shortly.";

/// Slots offered by the booking form
#[must_use]
pub fn available_slots() -> &'static [TimeSlot] {
    &TimeSlot::ALL
}

/// Validate `form` and book a pending appointment for the caller
///
/// Dates before `today` are refused without contacting the gateway.
pub async fn book(
    portal: &Portal,
    form: &BookingForm,
    today: NaiveDate,
) -> Result<Appointment, PortalError> {
    let account = portal.admit(Access::Authenticated)?;
    let booking = form.parse(account.id(), today)?;

    let appointment = portal.remote(
        portal
            .gateway()
            .create::<Appointment, _>(&account.session, &booking)
            .await,
    )?;
    tracing::info!(appointment = %appointment.id, date = %appointment.appointment_date, "appointment booked");
    Ok(appointment)
}
