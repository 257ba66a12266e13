//! Admin client directory

use crate::error::PortalError;
use crate::portal::Portal;
use crate::reducer::{Confirmed, ListState};
use crate::routes::Access;
use mindcare_gateway::{GatewayExt, Order, Query};
use mindcare_model::{Profile, ProfileId, Role};

#[derive(Debug, Default)]
pub struct AdminClients {
    pub list: ListState<Profile>,
    selected: Option<ProfileId>,
}

impl AdminClients {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every client profile, newest first
    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        let account = portal.admit(Access::Admin)?;
        let query = Query::all()
            .eq("role", Role::Client)
            .order(Order::desc("created_at"));
        let rows = portal.remote(portal.gateway().fetch::<Profile>(&account.session, &query).await)?;
        self.list.apply(Confirmed::Loaded(rows));
        if self.selected.is_some_and(|id| self.list.get(id.0).is_none()) {
            self.selected = None;
        }
        Ok(())
    }

    /// Select a listed client; unknown ids clear the selection
    pub fn select(&mut self, id: ProfileId) -> Option<&Profile> {
        self.selected = self.list.get(id.0).map(|p| p.id);
        self.selected()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Profile> {
        self.selected.and_then(|id| self.list.get(id.0))
    }
}
