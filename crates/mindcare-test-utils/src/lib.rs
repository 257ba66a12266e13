//! Testing utilities for the MindCare workspace
//!
//! Seeded in-memory gateways and record builders shared by the crates'
//! integration tests.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use chrono::{NaiveDate, Utc};
use mindcare_gateway::{Credentials, InMemoryGateway};
use mindcare_model::{Profile, ProfileId, Role};
use std::sync::Arc;

pub const PASSWORD: &str = "secret123";
pub const ADMIN_EMAIL: &str = "admin@mindcare.test";
pub const CLIENT_EMAIL: &str = "ada@example.com";
pub const OTHER_CLIENT_EMAIL: &str = "bob@example.com";

/// Gateway seeded with one admin and two clients
#[derive(Debug, Clone)]
pub struct Fixture {
    pub gateway: Arc<InMemoryGateway>,
    pub admin: ProfileId,
    pub client: ProfileId,
    pub other_client: ProfileId,
}

impl Fixture {
    #[must_use]
    pub fn admin_credentials(&self) -> Credentials {
        Credentials::new(ADMIN_EMAIL, PASSWORD)
    }

    #[must_use]
    pub fn client_credentials(&self) -> Credentials {
        Credentials::new(CLIENT_EMAIL, PASSWORD)
    }

    #[must_use]
    pub fn other_client_credentials(&self) -> Credentials {
        Credentials::new(OTHER_CLIENT_EMAIL, PASSWORD)
    }
}

#[must_use]
pub fn seeded_gateway() -> Fixture {
    seed(InMemoryGateway::new())
}

/// Seed an already configured gateway
#[must_use]
pub fn seed(gateway: InMemoryGateway) -> Fixture {
    let admin = gateway
        .seed_account(ADMIN_EMAIL, PASSWORD, "Practice Admin", Role::Admin)
        .unwrap();
    let client = gateway
        .seed_account(CLIENT_EMAIL, PASSWORD, "Ada Client", Role::Client)
        .unwrap();
    let other_client = gateway
        .seed_account(OTHER_CLIENT_EMAIL, PASSWORD, "Bob Client", Role::Client)
        .unwrap();
    Fixture {
        gateway: Arc::new(gateway),
        admin,
        client,
        other_client,
    }
}

/// Fixed "today" so date checks are deterministic
#[must_use]
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// Profile record without touching a gateway
#[must_use]
pub fn profile(role: Role) -> Profile {
    let now = Utc::now();
    Profile {
        id: ProfileId::new(),
        email: format!("{role}@example.com"),
        full_name: format!("Test {role}"),
        phone: None,
        date_of_birth: None,
        emergency_contact: None,
        medical_history: None,
        role,
        created_at: now,
        updated_at: now,
    }
}
