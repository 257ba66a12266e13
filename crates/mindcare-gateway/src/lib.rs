//! MindCare Gateway - auth and row access for the portal
//!
//! The portal never talks to a database directly. Everything goes through a
//! [`Gateway`]:
//! - [`HttpGateway`] for a hosted auth + REST backend
//! - [`InMemoryGateway`] for tests and local runs, enforcing the same
//!   row-level [`policy`]
//!
//! # Example
//!
//! ```rust,ignore
//! use mindcare_gateway::{Credentials, Gateway, GatewayExt, InMemoryGateway, Query};
//! use mindcare_model::{Appointment, Role};
//!
//! let gateway = InMemoryGateway::new();
//! gateway.seed_account("ada@example.com", "secret1", "Ada", Role::Client)?;
//! let session = gateway.sign_in(&Credentials::new("ada@example.com", "secret1")).await?;
//! let appointments: Vec<Appointment> = gateway.fetch(&session, &Query::all()).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod auth;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod persist;
pub mod policy;
pub mod query;

pub use auth::{AuthUser, Credentials, Session, SignUp, UserMetadata};
pub use error::GatewayError;
#[cfg(feature = "mock")]
pub use gateway::MockGateway;
pub use gateway::{Gateway, GatewayExt};
pub use http::{HttpGateway, HttpGatewayConfig};
pub use memory::InMemoryGateway;
pub use persist::SessionFile;
pub use policy::Caller;
pub use query::{Filter, FilterOp, Order, Query};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
