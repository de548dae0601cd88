//! Identifier newtypes for workshop records.
//!
//! Every record kind gets its own UUID wrapper so a vehicle identifier can
//! never be handed to an operation expecting an appointment.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! workshop_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random ", $label, " identifier.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", $label, " identifier from an existing UUID.")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value).map(Self)
            }
        }
    };
}

workshop_id!(
    /// Unique identifier for a workshop client.
    ClientId,
    "client"
);

workshop_id!(
    /// Unique identifier for a registered vehicle.
    VehicleId,
    "vehicle"
);

workshop_id!(
    /// Unique identifier for a mechanic.
    MechanicId,
    "mechanic"
);

workshop_id!(
    /// Unique identifier for a scheduled appointment.
    AppointmentId,
    "appointment"
);

workshop_id!(
    /// Unique identifier for a repair job.
    RepairId,
    "repair"
);
