//! MindCare Core - the booking and consultation portal
//!
//! Brings together:
//! - [`Portal`], the context every view runs against
//! - the [`SessionStore`] and its route guard
//! - client views (dashboard, booking, consultation, profile)
//! - admin views (stats, appointments, clients, consultations)
//!
//! # Example
//!
//! ```rust,ignore
//! use mindcare_core::{views, Portal, PortalConfig};
//! use mindcare_model::BookingForm;
//!
//! let portal = Portal::connect(PortalConfig::load(None)?)?;
//! portal.start().await?;
//!
//! let form = BookingForm {
//!     appointment_date: "2030-01-01".into(),
//!     appointment_time: "09:00".into(),
//!     notes: String::new(),
//! };
//! let appointment = views::booking::book(&portal, &form, Portal::today()).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod portal;
pub mod reducer;
pub mod routes;
pub mod session;
pub mod views;

pub use config::{ConfigError, PortalConfig};
pub use error::PortalError;
pub use guard::{decide, Decision};
pub use portal::Portal;
pub use reducer::{Confirmed, ListState, Merge};
pub use routes::{home_for, menu, Access, Route};
pub use session::{Account, Identity, Registration, SessionState, SessionStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building on the portal
    pub use crate::{
        Access, Decision, Identity, Portal, PortalConfig, PortalError, Route, SessionStore,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
