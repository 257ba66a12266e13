//! Profile editor

use crate::error::PortalError;
use crate::portal::Portal;
use crate::routes::Access;
use mindcare_gateway::GatewayExt;
use mindcare_model::{Profile, ProfileForm};

pub const SAVED_NOTICE: &str = "Profile updated successfully!";

/// Editable copy of the caller's profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEditor {
    pub form: ProfileForm,
}

impl ProfileEditor {
    /// Pre-fill from the cached profile
    pub fn open(portal: &Portal) -> Result<Self, PortalError> {
        let account = portal.admit(Access::Authenticated)?;
        Ok(Self {
            form: ProfileForm::from_profile(&account.profile),
        })
    }

    /// Save the form and refresh the cached profile
    pub async fn save(&self, portal: &Portal) -> Result<Profile, PortalError> {
        let account = portal.admit(Access::Authenticated)?;
        let update = self.form.parse()?;

        let profile = portal.remote(
            portal
                .gateway()
                .modify::<Profile, _>(&account.session, account.id().0, &update)
                .await,
        )?;
        portal.session().replace_profile(profile.clone());
        Ok(profile)
    }
}
