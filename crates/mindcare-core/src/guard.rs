//! Route guard
//!
//! Decisions are pure functions of the session state: no network calls,
//! and asking twice without a state change gives the same answer.

use crate::error::PortalError;
use crate::routes::{Access, Route};
use crate::session::{Account, SessionState, SessionStore};
use mindcare_model::Role;

/// Guard outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Render the view
    Proceed,
    /// Session still loading; render a neutral placeholder and query nothing
    Wait,
    /// Go elsewhere
    Redirect(Route),
}

/// Decide whether `state` may enter a route with `access`
#[must_use]
pub fn decide(state: &SessionState, access: Access) -> Decision {
    match (access, state) {
        (Access::Public, _) => Decision::Proceed,
        (_, SessionState::Uninitialized | SessionState::Loading) => Decision::Wait,
        (_, SessionState::Anonymous) => Decision::Redirect(Route::Login),
        (Access::Authenticated, SessionState::Authenticated(_)) => Decision::Proceed,
        (Access::Admin, SessionState::Authenticated(account)) => {
            if account.profile.role.is_admin() {
                Decision::Proceed
            } else {
                Decision::Redirect(Route::Dashboard)
            }
        }
    }
}

impl SessionStore {
    #[must_use]
    pub fn require_authenticated(&self) -> Decision {
        self.with_state(|state| decide(state, Access::Authenticated))
    }

    /// Check the signed-in profile holds `role`
    ///
    /// Every signed-in profile satisfies [`Role::Client`]-level access.
    #[must_use]
    pub fn require_role(&self, role: Role) -> Decision {
        let access = match role {
            Role::Admin => Access::Admin,
            Role::Client => Access::Authenticated,
        };
        self.with_state(|state| decide(state, access))
    }

    /// Guard for entering `route`
    #[must_use]
    pub fn enter(&self, route: Route) -> Decision {
        self.with_state(|state| decide(state, route.access()))
    }

    /// Account to run a protected action as, or the error describing why not
    pub fn admit(&self, access: Access) -> Result<Account, PortalError> {
        self.with_state(|state| match (decide(state, access), state) {
            (Decision::Proceed, SessionState::Authenticated(account)) => Ok((**account).clone()),
            (Decision::Proceed | Decision::Redirect(Route::Login), _) => Err(
                PortalError::sign_in_required("Please sign in to continue"),
            ),
            (Decision::Wait, _) => Err(PortalError::SessionLoading),
            (Decision::Redirect(redirect), _) => Err(PortalError::Authorization { redirect }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mindcare_gateway::{AuthUser, Session};
    use mindcare_model::{Profile, ProfileId};

    fn authenticated(role: Role) -> SessionState {
        let id = ProfileId::new();
        let profile = Profile {
            id,
            email: "ada@example.com".to_string(),
            full_name: "Ada".to_string(),
            phone: None,
            date_of_birth: None,
            emergency_contact: None,
            medical_history: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let session = Session::new(
            "token",
            AuthUser::new(id, None),
            chrono::Duration::hours(1),
        );
        SessionState::Authenticated(Box::new(Account { session, profile }))
    }

    #[test]
    fn loading_waits_everywhere_but_public() {
        for state in [SessionState::Uninitialized, SessionState::Loading] {
            assert_eq!(decide(&state, Access::Authenticated), Decision::Wait);
            assert_eq!(decide(&state, Access::Admin), Decision::Wait);
            assert_eq!(decide(&state, Access::Public), Decision::Proceed);
        }
    }

    #[test]
    fn anonymous_goes_to_login() {
        let state = SessionState::Anonymous;
        assert_eq!(decide(&state, Access::Authenticated), Decision::Redirect(Route::Login));
        assert_eq!(decide(&state, Access::Admin), Decision::Redirect(Route::Login));
    }

    #[test]
    fn clients_bounce_off_admin_routes() {
        let client = authenticated(Role::Client);
        assert_eq!(decide(&client, Access::Admin), Decision::Redirect(Route::Dashboard));
        assert_eq!(decide(&client, Access::Authenticated), Decision::Proceed);

        let admin = authenticated(Role::Admin);
        assert_eq!(decide(&admin, Access::Admin), Decision::Proceed);
        assert_eq!(decide(&admin, Access::Authenticated), Decision::Proceed);
    }
}
