//! Append-only audit trail for process mutations
//!
//! Every successful create/update/soft-delete appends exactly one row
//! snapshotting the process's resulting status and description. Rows are
//! never updated; the only deletion path is the hard-delete cascade of the
//! owning process.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    id::{HistoryId, ProcessId},
    process::{Process, ProcessStatus}
};

/// Why a history row was appended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeLabel {
    Created,
    Updated,
    SoftDeleted
}

impl fmt::Display for ChangeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeLabel::Created => "Creación",
            ChangeLabel::Updated => "Actualización",
            ChangeLabel::SoftDeleted => "Soft delete (INACTIVE)"
        };
        write!(f, "{}", label)
    }
}

/// One audit row
///
/// `actor` and `label` are separate fields: the actor email may be absent for
/// system-initiated changes, the label never is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessHistory {
    pub id:          HistoryId,
    pub process_id:  ProcessId,
    pub actor:       Option<String>,
    pub label:       ChangeLabel,
    /// Status of the process after the recorded change
    pub status:      ProcessStatus,
    /// Description of the process after the recorded change
    pub description: String,
    pub created_at:  DateTime<Utc>
}

impl ProcessHistory {
    /// Snapshot the process's current state under the given label.
    ///
    /// The row id stays unassigned; the store allocates it when the row is
    /// appended together with the process save.
    pub fn snapshot(process: &Process, actor: Option<&str>, label: ChangeLabel) -> Self {
        Self {
            id:          HistoryId::UNASSIGNED,
            process_id:  process.id,
            actor:       actor.map(str::to_string),
            label,
            status:      process.status,
            description: process.description.clone(),
            created_at:  Utc::now()
        }
    }
}
