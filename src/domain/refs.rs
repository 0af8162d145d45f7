//! Reference entities: activities, arches and gateways
//!
//! Processes hold these by id only (membership, not ownership). They carry no
//! organization: activities are shared across tenants in the current design,
//! which is why role assignment checks the role's organization but not the
//! activity's.

use serde::{Deserialize, Serialize};

use crate::domain::id::{ActivityId, ArchId, GatewayId};

/// A unit of work referenced by processes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id:   ActivityId,
    pub name: String
}

/// A decision arch between activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arch {
    pub id:   ArchId,
    pub name: String
}

/// A gateway splitting or joining flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub id:   GatewayId,
    pub name: String
}
