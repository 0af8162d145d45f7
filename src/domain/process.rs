//! Process entity and its lifecycle payloads
//!
//! A process belongs to exactly one organization, fixed at creation from the
//! creator's organization. The create payload deliberately has no
//! organization field, so a caller cannot escalate across tenants even with a
//! forged request body.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::id::{ActivityId, ArchId, GatewayId, OrgId, ProcessId};

/// Lifecycle status of a process
///
/// Transitions among the three states are unconstrained, except that soft
/// delete always forces `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessStatus {
    #[value(name = "draft")]
    Draft,
    #[value(name = "published")]
    Published,
    #[value(name = "inactive")]
    Inactive
}

impl Default for ProcessStatus {
    fn default() -> Self {
        ProcessStatus::Draft
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessStatus::Draft => "DRAFT",
            ProcessStatus::Published => "PUBLISHED",
            ProcessStatus::Inactive => "INACTIVE"
        };
        write!(f, "{}", name)
    }
}

/// A business process owned by one organization
///
/// Referenced activities/arches/gateways are held by id only; existence is
/// validated on create/update, membership implies no ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id:           ProcessId,
    pub name:         String,
    pub description:  String,
    pub category:     String,
    pub status:       ProcessStatus,
    /// Immutable after creation; always the creator's organization
    pub organization: OrgId,
    pub activity_ids: Vec<ActivityId>,
    pub arch_ids:     Vec<ArchId>,
    pub gateway_ids:  Vec<GatewayId>
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Creation payload for a process
///
/// No organization field: the engine always takes it from the actor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProcess {
    pub name:         String,
    pub description:  String,
    pub category:     String,
    /// Defaults to [`ProcessStatus::Draft`] when unset
    pub status:       Option<ProcessStatus>,
    pub activity_ids: Vec<ActivityId>,
    pub arch_ids:     Vec<ArchId>,
    pub gateway_ids:  Vec<GatewayId>
}

/// Partial update for a process
///
/// `None` leaves the existing value untouched; a supplied reference list
/// replaces the previous one wholesale and is re-resolved against the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessPatch {
    pub name:         Option<String>,
    pub description:  Option<String>,
    pub category:     Option<String>,
    pub status:       Option<ProcessStatus>,
    pub activity_ids: Option<Vec<ActivityId>>,
    pub arch_ids:     Option<Vec<ArchId>>,
    pub gateway_ids:  Option<Vec<GatewayId>>
}

impl ProcessPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.activity_ids.is_none()
            && self.arch_ids.is_none()
            && self.gateway_ids.is_none()
    }
}
