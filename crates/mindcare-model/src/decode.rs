//! Boundary decoding
//!
//! The gateway speaks loosely-typed JSON rows. Rows are decoded here, once,
//! into typed records; nothing past this module handles a raw row.

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Named gateway collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// User profiles
    Profiles,
    /// Appointments
    Appointments,
    /// Consultation requests
    ConsultationRequests,
}

impl Collection {
    /// Table name on the gateway
    #[inline]
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Profiles => "profiles",
            Collection::Appointments => "appointments",
            Collection::ConsultationRequests => "consultation_requests",
        }
    }

    /// Every collection
    pub const ALL: [Collection; 3] = [
        Collection::Profiles,
        Collection::Appointments,
        Collection::ConsultationRequests,
    ];
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A record stored in one gateway collection
pub trait Record: DeserializeOwned {
    /// Collection holding this record
    const COLLECTION: Collection;

    /// Primary key
    fn key(&self) -> Uuid;
}

/// Decode one row into `T`
pub fn decode_row<T: Record>(row: Value) -> Result<T, DecodeError> {
    serde_json::from_value(row).map_err(|source| DecodeError::Malformed {
        collection: T::COLLECTION,
        source,
    })
}

/// Decode every row, failing on the first malformed one
pub fn decode_rows<T: Record>(rows: Vec<Value>) -> Result<Vec<T>, DecodeError> {
    rows.into_iter().map(decode_row).collect()
}
