//! Post-confirmation list reducer
//!
//! Views keep fetched rows in a [`ListState`]. The list only changes through
//! [`ListState::apply`], which takes a [`Confirmed`] change; a `Confirmed`
//! value is built from a record the gateway has already returned, so a failed
//! call leaves the list as it was.

use mindcare_model::{Appointment, AppointmentWithClient, ConsultationRequest, ConsultationWithClient, Record};
use uuid::Uuid;

/// How a confirmed record of type `U` lands in a list of `Self`
pub trait Merge<U>: Sized {
    /// Row for a record the list does not hold yet
    fn lift(confirmed: U) -> Self;

    /// Fold the record into an existing row
    fn merge(&mut self, confirmed: U);
}

impl<T: Record> Merge<T> for T {
    fn lift(confirmed: T) -> Self {
        confirmed
    }

    fn merge(&mut self, confirmed: T) {
        *self = confirmed;
    }
}

impl Merge<Appointment> for AppointmentWithClient {
    fn lift(appointment: Appointment) -> Self {
        Self {
            appointment,
            client: None,
        }
    }

    fn merge(&mut self, confirmed: Appointment) {
        self.appointment = confirmed;
    }
}

impl Merge<ConsultationRequest> for ConsultationWithClient {
    fn lift(request: ConsultationRequest) -> Self {
        Self {
            request,
            client: None,
        }
    }

    fn merge(&mut self, confirmed: ConsultationRequest) {
        self.request = confirmed;
    }
}

/// Change the gateway has acknowledged
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmed<U> {
    /// Fresh query result
    Loaded(Vec<U>),
    /// Newly stored row, shown first
    Inserted(U),
    /// Stored version of an existing row
    Updated(U),
}

/// Rows held by a view
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    items: Vec<T>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Record> ListState<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Fold a confirmed change into the list
    ///
    /// Returns `false` when an update names a row the list does not hold.
    pub fn apply<U>(&mut self, change: Confirmed<U>) -> bool
    where
        U: Record,
        T: Merge<U>,
    {
        match change {
            Confirmed::Loaded(rows) => {
                self.items = rows.into_iter().map(T::lift).collect();
                true
            }
            Confirmed::Inserted(row) => {
                self.items.insert(0, T::lift(row));
                true
            }
            Confirmed::Updated(row) => {
                let key = row.key();
                match self.items.iter_mut().find(|item| item.key() == key) {
                    Some(item) => {
                        item.merge(row);
                        true
                    }
                    None => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use mindcare_model::{AppointmentId, AppointmentStatus, ClientContact, ProfileId, TimeSlot};

    fn appointment(status: AppointmentStatus) -> Appointment {
        Appointment {
            id: AppointmentId::new(),
            client_id: ProfileId::new(),
            appointment_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            appointment_time: TimeSlot::ALL[0],
            status,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn update_replaces_matching_row_only() {
        let first = appointment(AppointmentStatus::Pending);
        let second = appointment(AppointmentStatus::Pending);
        let mut list: ListState<Appointment> = ListState::new();
        list.apply(Confirmed::Loaded(vec![first.clone(), second.clone()]));

        let mut confirmed = first.clone();
        confirmed.status = AppointmentStatus::Confirmed;
        assert!(list.apply(Confirmed::Updated(confirmed)));

        assert_eq!(list.get(first.id.0).unwrap().status, AppointmentStatus::Confirmed);
        assert_eq!(list.get(second.id.0).unwrap().status, AppointmentStatus::Pending);
        assert!(!list.apply(Confirmed::Updated(appointment(AppointmentStatus::Cancelled))));
    }

    #[test]
    fn joined_rows_keep_client_contact() {
        let row = appointment(AppointmentStatus::Pending);
        let joined = AppointmentWithClient {
            appointment: row.clone(),
            client: Some(ClientContact {
                full_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            }),
        };
        let mut list: ListState<AppointmentWithClient> = ListState::new();
        list.apply(Confirmed::Loaded(vec![joined]));

        let mut confirmed = row;
        confirmed.status = AppointmentStatus::Cancelled;
        assert!(list.apply(Confirmed::Updated(confirmed)));

        let held = &list.items()[0];
        assert_eq!(held.appointment.status, AppointmentStatus::Cancelled);
        assert_eq!(held.client.as_ref().unwrap().full_name, "Ada");
    }

    #[test]
    fn inserts_go_first() {
        let mut list: ListState<Appointment> = ListState::new();
        let older = appointment(AppointmentStatus::Pending);
        let newer = appointment(AppointmentStatus::Pending);
        list.apply(Confirmed::Loaded(vec![older]));
        list.apply(Confirmed::Inserted(newer.clone()));
        assert_eq!(list.items()[0].id, newer.id);
        assert_eq!(list.len(), 2);
    }
}
