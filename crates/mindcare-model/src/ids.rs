//! Record identifiers
//!
//! Thin wrappers over the gateway's UUID keys so a profile id cannot be
//! passed where an appointment id is expected.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate new random id
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Underlying UUID
            #[inline]
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Profile identifier, equal to the authentication identity
    ProfileId
);

record_id!(
    /// Appointment identifier
    AppointmentId
);

record_id!(
    /// Consultation request identifier
    ConsultationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_and_display() {
        let raw = "6f1c2d4e-8a9b-4c3d-9e8f-0a1b2c3d4e5f";
        let id = ProfileId::from_str(raw).unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn ids_serialize_as_plain_uuid() {
        let id = AppointmentId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }
}
