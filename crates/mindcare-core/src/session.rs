//! Session/profile store
//!
//! One store per running portal. It is the only writer of the session cell;
//! views read it through the guard in [`crate::guard`].
//!
//! ```text
//! Uninitialized -> Loading -> Anonymous
//!                          -> Authenticated(profile) -> Anonymous
//! ```
//!
//! `Authenticated -> Anonymous` happens on sign-out and whenever the gateway
//! reports the session as expired.
//!
//! A session the gateway still holds while the store is anonymous (profile
//! fetch failed, token rejected) is kept aside so `sign_out` can revoke it.

use crate::error::PortalError;
use mindcare_gateway::{Credentials, Gateway, GatewayError, GatewayExt, Session};
use mindcare_model::{Collection, LoginForm, NewProfile, Profile, ProfileId, RegistrationForm};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Signed-in session and its profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub session: Session,
    pub profile: Profile,
}

impl Account {
    #[inline]
    #[must_use]
    pub fn id(&self) -> ProfileId {
        self.profile.id
    }
}

/// Full session state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Launch not yet handled
    #[default]
    Uninitialized,
    /// Waiting on the gateway
    Loading,
    /// No session
    Anonymous,
    /// Session and profile present
    Authenticated(Box<Account>),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Loading => "loading",
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticated(_) => "authenticated",
        }
    }
}

/// What views see of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Loading,
    Anonymous,
    Authenticated(Profile),
}

/// Outcome of a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Account and profile created; the user is signed in
    SignedIn(Profile),
    /// Account created; the gateway waits for email confirmation
    ConfirmationPending { email: String },
}

/// Process-wide session cell
pub struct SessionStore {
    gateway: Arc<dyn Gateway>,
    state: RwLock<SessionState>,
    stranded: Mutex<Option<Session>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state.read().name())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(SessionState::Uninitialized),
            stranded: Mutex::new(None),
        }
    }

    /// Snapshot of the full state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.read())
    }

    #[must_use]
    pub fn current_identity(&self) -> Identity {
        match &*self.state.read() {
            SessionState::Uninitialized | SessionState::Loading => Identity::Loading,
            SessionState::Anonymous => Identity::Anonymous,
            SessionState::Authenticated(account) => Identity::Authenticated(account.profile.clone()),
        }
    }

    /// Signed-in account, if any
    #[must_use]
    pub fn account(&self) -> Option<Account> {
        match &*self.state.read() {
            SessionState::Authenticated(account) => Some((**account).clone()),
            _ => None,
        }
    }

    fn transition(&self, next: SessionState) {
        let mut state = self.state.write();
        tracing::info!(from = state.name(), to = next.name(), "session transition");
        if matches!(next, SessionState::Authenticated(_)) {
            *self.stranded.lock() = None;
        }
        *state = next;
    }

    /// Go anonymous while the gateway may still hold `session`
    fn strand(&self, session: Session) {
        *self.stranded.lock() = Some(session);
        self.transition(SessionState::Anonymous);
    }

    fn authenticate(&self, session: Session, profile: Profile) {
        self.transition(SessionState::Authenticated(Box::new(Account { session, profile })));
    }

    /// Pick up a persisted session at launch
    pub async fn initialize(&self) -> Result<Identity, PortalError> {
        self.transition(SessionState::Loading);

        let session = match self.gateway.current_session().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted session");
                self.transition(SessionState::Anonymous);
                return Err(err.into());
            }
        };

        match session {
            Some(session) => self.establish(session).await.map(Identity::Authenticated),
            None => {
                self.transition(SessionState::Anonymous);
                Ok(Identity::Anonymous)
            }
        }
    }

    /// Fetch the profile for `session` and become authenticated
    ///
    /// An identity without a profile row (registered while email confirmation
    /// was pending) gets one created from its auth metadata. On failure the
    /// store resolves to anonymous and the error is returned.
    async fn establish(&self, session: Session) -> Result<Profile, PortalError> {
        let own = session.user_id();
        let profile = match self.gateway.fetch_one::<Profile>(&session, own.0).await {
            Err(GatewayError::NotFound {
                collection: Collection::Profiles,
                id,
            }) if id == own.0 => {
                tracing::info!(user = %own, "no profile row yet, creating one");
                self.create_profile(&session, None).await
            }
            fetched => fetched,
        };

        match profile {
            Ok(profile) => {
                tracing::info!(user = %profile.id, role = %profile.role, "signed in");
                self.authenticate(session, profile.clone());
                Ok(profile)
            }
            Err(err) => {
                tracing::warn!(error = %err, "profile fetch failed");
                self.strand(session);
                Err(err.into())
            }
        }
    }

    /// Insert the profile row for the session's own identity
    async fn create_profile(
        &self,
        session: &Session,
        full_name: Option<String>,
    ) -> Result<Profile, GatewayError> {
        let user = &session.user;
        let profile = NewProfile {
            id: user.id,
            email: user.email.clone().unwrap_or_default(),
            full_name: full_name.unwrap_or_else(|| user.display_name()),
        };
        self.gateway.create::<Profile, _>(session, &profile).await
    }

    pub async fn sign_in(&self, form: &LoginForm) -> Result<Profile, PortalError> {
        form.validate()?;
        let credentials = Credentials::new(form.email.trim(), form.password.clone());
        let session = self.gateway.sign_in(&credentials).await?;
        self.establish(session).await
    }

    /// Register an account and create its profile
    pub async fn sign_up(&self, form: &RegistrationForm) -> Result<Registration, PortalError> {
        form.validate()?;
        let email = form.email.trim().to_string();
        let full_name = form.full_name.trim().to_string();
        let credentials =
            Credentials::new(email.clone(), form.password.clone()).with_full_name(full_name.clone());
        let signed_up = self.gateway.sign_up(&credentials).await?;

        let Some(session) = signed_up.session else {
            tracing::info!(user = %signed_up.user.id, "sign-up awaiting email confirmation");
            self.transition(SessionState::Anonymous);
            return Ok(Registration::ConfirmationPending { email });
        };

        match self.create_profile(&session, Some(full_name)).await {
            Ok(profile) => {
                tracing::info!(user = %profile.id, "registered");
                self.authenticate(session, profile.clone());
                Ok(Registration::SignedIn(profile))
            }
            Err(err) => {
                tracing::warn!(error = %err, "profile creation failed");
                self.strand(session);
                Err(err.into())
            }
        }
    }

    /// Revoke the session and become anonymous
    ///
    /// The local effect is unconditional; a failed remote revoke is logged.
    /// A stranded session is revoked as well.
    pub async fn sign_out(&self) {
        let session = self.account().map(|account| account.session);
        let stranded = self.stranded.lock().take();
        self.transition(SessionState::Anonymous);

        for session in session.into_iter().chain(stranded) {
            if let Err(err) = self.gateway.sign_out(&session).await {
                tracing::warn!(error = %err, "remote sign-out failed");
            }
        }
    }

    /// Swap in a freshly saved profile for the signed-in account
    pub fn replace_profile(&self, profile: Profile) {
        let mut state = self.state.write();
        if let SessionState::Authenticated(account) = &mut *state {
            if account.profile.id == profile.id {
                account.profile = profile;
            }
        }
    }

    /// Map a gateway result, dropping the session on auth failures
    pub fn remote<T>(&self, result: Result<T, GatewayError>) -> Result<T, PortalError> {
        result.map_err(|err| {
            if err.is_auth_failure() {
                tracing::warn!(error = %err, "gateway rejected session");
                match self.account() {
                    Some(account) => self.strand(account.session),
                    None => self.transition(SessionState::Anonymous),
                }
                PortalError::sign_in_required("Your session has expired. Please sign in again")
            } else {
                tracing::warn!(error = %err, "gateway call failed");
                PortalError::Remote(err)
            }
        })
    }
}
