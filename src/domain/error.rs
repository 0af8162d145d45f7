use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kinds of persisted entities, used to qualify not-found errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Organization,
    Persona,
    Process,
    ProcessRole,
    Activity,
    Arch,
    Gateway
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Organization => "organization",
            EntityKind::Persona => "persona",
            EntityKind::Process => "process",
            EntityKind::ProcessRole => "process role",
            EntityKind::Activity => "activity",
            EntityKind::Arch => "arch",
            EntityKind::Gateway => "gateway"
        };
        write!(f, "{}", name)
    }
}

/// Domain error kinds surfaced by every core operation
///
/// All variants are fatal to the enclosing operation; the core performs no
/// internal recovery or retries. Only `Persistence` is rendered as a generic
/// failure at the boundary, the rest carry actionable detail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The resolved actor identity does not exist
    #[error("actor not found")]
    ActorNotFound,

    /// The actor has no organization and therefore cannot touch scoped data
    #[error("actor has no associated organization")]
    NoOrganization,

    /// The actor targeted a record owned by another organization
    #[error("not authorized to operate on records of another organization")]
    CrossOrgAccess,

    /// The operation's target does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    /// A referenced activity/arch/gateway does not exist
    #[error("{kind} {id} does not exist")]
    ReferenceNotFound { kind: EntityKind, id: u64 },

    /// Role-based denial
    #[error("{0}")]
    Forbidden(String),

    /// Referential-integrity denial, distinct from `Forbidden` so callers can
    /// remediate instead of re-authenticating
    #[error("{0}")]
    Conflict(String),

    /// Underlying store unavailable or write rejected
    #[error("storage failure: {0}")]
    Persistence(String)
}

impl DomainError {
    pub fn not_found(kind: EntityKind, id: impl Into<u64>) -> Self {
        DomainError::NotFound { kind, id: id.into() }
    }

    pub fn reference_not_found(kind: EntityKind, id: impl Into<u64>) -> Self {
        DomainError::ReferenceNotFound { kind, id: id.into() }
    }
}

/// Convert from serde_json::Error (row encoding inside storage adapters)
impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Persistence(err.to_string())
    }
}
