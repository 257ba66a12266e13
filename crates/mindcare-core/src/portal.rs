//! Portal context
//!
//! Created once at process start and passed to every view. Owns the gateway
//! handle and the session store.

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::guard::Decision;
use crate::routes::{self, Access, Route};
use crate::session::{Account, Identity, Registration, SessionStore};
use chrono::{Local, NaiveDate};
use mindcare_gateway::{Gateway, GatewayError, HttpGateway};
use mindcare_model::{LoginForm, Profile, RegistrationForm};
use std::sync::Arc;

/// Injectable portal context
pub struct Portal {
    config: PortalConfig,
    gateway: Arc<dyn Gateway>,
    session: SessionStore,
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Portal {
    /// Create a portal over `gateway`
    #[must_use]
    pub fn new(config: PortalConfig, gateway: Arc<dyn Gateway>) -> Self {
        let session = SessionStore::new(Arc::clone(&gateway));
        Self {
            config,
            gateway,
            session,
        }
    }

    /// Create a portal talking to the configured HTTP gateway
    pub fn connect(config: PortalConfig) -> Result<Self, PortalError> {
        let settings = config.gateway()?;
        let gateway = HttpGateway::new(settings)?;
        tracing::debug!(url = config.gateway_url.as_deref().unwrap_or_default(), "gateway configured");
        Ok(Self::new(config, Arc::new(gateway)))
    }

    /// Resolve the persisted session
    pub async fn start(&self) -> Result<Identity, PortalError> {
        self.session.initialize().await
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Local calendar date, used for booking and dashboard cut-offs
    #[must_use]
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Sign in and return the role's home route
    pub async fn sign_in(&self, form: &LoginForm) -> Result<(Profile, Route), PortalError> {
        let profile = self.session.sign_in(form).await?;
        let home = routes::home_for(profile.role);
        Ok((profile, home))
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<Registration, PortalError> {
        self.session.sign_up(form).await
    }

    /// Sign out and return the public entry route
    pub async fn sign_out(&self) -> Route {
        self.session.sign_out().await;
        Route::Landing
    }

    /// Guard decision for entering `route`
    #[must_use]
    pub fn enter(&self, route: Route) -> Decision {
        self.session.enter(route)
    }

    pub(crate) fn admit(&self, access: Access) -> Result<Account, PortalError> {
        self.session.admit(access)
    }

    pub(crate) fn remote<T>(&self, result: Result<T, GatewayError>) -> Result<T, PortalError> {
        self.session.remote(result)
    }
}
