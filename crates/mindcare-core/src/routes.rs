//! Routes and navigation

use mindcare_model::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who may enter a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    /// Anyone
    Public,
    /// Any signed-in profile
    Authenticated,
    /// Signed-in admins only
    Admin,
}

/// Every portal route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
    BookAppointment,
    Consultation,
    Profile,
    Admin,
    AdminAppointments,
    AdminClients,
    AdminConsultations,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Landing,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::BookAppointment,
        Route::Consultation,
        Route::Profile,
        Route::Admin,
        Route::AdminAppointments,
        Route::AdminClients,
        Route::AdminConsultations,
    ];

    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::BookAppointment => "/book-appointment",
            Route::Consultation => "/consultation",
            Route::Profile => "/profile",
            Route::Admin => "/admin",
            Route::AdminAppointments => "/admin/appointments",
            Route::AdminClients => "/admin/clients",
            Route::AdminConsultations => "/admin/consultations",
        }
    }

    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Route::Landing | Route::Login | Route::Register => Access::Public,
            Route::Dashboard | Route::BookAppointment | Route::Consultation | Route::Profile => {
                Access::Authenticated
            }
            Route::Admin
            | Route::AdminAppointments
            | Route::AdminClients
            | Route::AdminConsultations => Access::Admin,
        }
    }

    /// Menu label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Route::Landing => "Home",
            Route::Login => "Sign In",
            Route::Register => "Sign Up",
            Route::Dashboard => "Dashboard",
            Route::BookAppointment => "Book Appointment",
            Route::Consultation => "Consultation",
            Route::Profile => "Profile",
            Route::Admin => "Admin Dashboard",
            Route::AdminAppointments => "Appointments",
            Route::AdminClients => "Clients",
            Route::AdminConsultations => "Consultations",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = match s.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Route::ALL
            .into_iter()
            .find(|r| r.path() == path)
            .ok_or_else(|| format!("unknown route: {s}"))
    }
}

/// Landing route after sign-in
#[must_use]
pub fn home_for(role: Role) -> Route {
    match role {
        Role::Admin => Route::Admin,
        Role::Client => Route::Dashboard,
    }
}

/// Menu entries for the current identity; `None` means signed out
#[must_use]
pub fn menu(role: Option<Role>) -> &'static [Route] {
    match role {
        None => &[Route::Landing, Route::Login, Route::Register],
        Some(Role::Client) => &[
            Route::Dashboard,
            Route::BookAppointment,
            Route::Consultation,
            Route::Profile,
        ],
        Some(Role::Admin) => &[
            Route::Admin,
            Route::AdminAppointments,
            Route::AdminClients,
            Route::AdminConsultations,
            Route::Profile,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(route.path().parse::<Route>(), Ok(route));
        }
        assert_eq!("/admin/clients/".parse::<Route>(), Ok(Route::AdminClients));
        assert!("/nowhere".parse::<Route>().is_err());
    }

    #[test]
    fn home_depends_on_role() {
        assert_eq!(home_for(Role::Admin), Route::Admin);
        assert_eq!(home_for(Role::Client), Route::Dashboard);
    }

    #[test]
    fn client_menu_has_no_admin_routes() {
        assert!(menu(Some(Role::Client))
            .iter()
            .all(|r| r.access() != Access::Admin));
        assert!(menu(None).iter().all(|r| r.access() == Access::Public));
    }
}
