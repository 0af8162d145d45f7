//! Process roles and their linkage to activities

use serde::{Deserialize, Serialize};

use crate::domain::id::{ActivityId, LinkId, OrgId, ProcessId, RoleId};

/// A role that personas can play inside processes, scoped to one organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRole {
    pub id:           RoleId,
    pub name:         String,
    /// Immutable after creation
    pub organization: OrgId
}

/// Creation payload for a process role; organization is taken from the actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String
}

/// Many-to-many link row between one activity and one role
///
/// The (activity, role) pair is unique; assigning the same pair twice fails
/// with a conflict instead of silently inserting a duplicate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRoleLink {
    pub id:          LinkId,
    pub activity_id: ActivityId,
    pub role_id:     RoleId
}

/// Where-used answer for a role
///
/// `process_ids` is the set of processes in the role's organization whose
/// activity references intersect `activity_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleUsage {
    pub activity_ids: Vec<ActivityId>,
    pub process_ids:  Vec<ProcessId>
}
