//! Typed identifiers for every persisted entity
//!
//! Ids are plain `u64` newtypes so a `ProcessId` can never be passed where an
//! `OrgId` is expected. Id `0` is the "not yet persisted" sentinel: stores
//! assign the next sequence value on save.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Sentinel for records that have not been persisted yet.
            pub const UNASSIGNED: Self = Self(0);

            pub fn is_assigned(&self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of an [`crate::domain::Organization`]
    OrgId
);
entity_id!(
    /// Identifier of a [`crate::domain::Persona`]
    PersonaId
);
entity_id!(
    /// Identifier of a [`crate::domain::Process`]
    ProcessId
);
entity_id!(
    /// Identifier of a [`crate::domain::ProcessRole`]
    RoleId
);
entity_id!(
    /// Identifier of an [`crate::domain::Activity`]
    ActivityId
);
entity_id!(
    /// Identifier of an [`crate::domain::Arch`]
    ArchId
);
entity_id!(
    /// Identifier of a [`crate::domain::Gateway`]
    GatewayId
);
entity_id!(
    /// Identifier of an [`crate::domain::ActivityRoleLink`]
    LinkId
);
entity_id!(
    /// Identifier of a [`crate::domain::ProcessHistory`] row
    HistoryId
);
