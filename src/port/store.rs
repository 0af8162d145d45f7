//! Storage ports - the persistence primitives the core assumes
//!
//! Each method is one atomic, strongly consistent call; the core layers no
//! locking or transactions on top. Implementations may block internally
//! (RocksDB behind `spawn_blocking`) or be purely in memory; the core only
//! awaits them.
//!
//! Ids with value `0` are unassigned: `save` allocates the next sequence
//! value and returns the stored record.

use async_trait::async_trait;

use crate::domain::{
    Activity, ActivityRoleLink, Arch, DomainError, Gateway, Organization, Persona, Process, ProcessHistory,
    ProcessRole,
    id::{ActivityId, ArchId, GatewayId, LinkId, OrgId, PersonaId, ProcessId, RoleId}
};

/// Port for organization lookup and seeding
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find_by_id(&self, id: OrgId) -> Result<Option<Organization>, DomainError>;

    async fn save(&self, org: Organization) -> Result<Organization, DomainError>;
}

/// Port for persona lookup and registration
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// Case-insensitive email lookup; the identity collaborator's single
    /// primitive
    async fn find_by_email(&self, email: &str) -> Result<Option<Persona>, DomainError>;

    async fn find_by_id(&self, id: PersonaId) -> Result<Option<Persona>, DomainError>;

    async fn save(&self, persona: Persona) -> Result<Persona, DomainError>;

    async fn delete(&self, id: PersonaId) -> Result<(), DomainError>;

    async fn list(&self) -> Result<Vec<Persona>, DomainError>;
}

/// Port for process records
///
/// `save_with_history` and `delete_with_history` are the write paths: the
/// process save and its history append (or cascade) are one unit of work, so
/// a rejected write never leaves a dangling audit row.
#[async_trait]
pub trait ProcessStore: Send + Sync {
    async fn find_by_id(&self, id: ProcessId) -> Result<Option<Process>, DomainError>;

    async fn find_all_by_org(&self, org: OrgId) -> Result<Vec<Process>, DomainError>;

    /// Processes of `org` referencing at least one of `activity_ids`.
    ///
    /// Served by an index maintained incrementally on save/delete, not by
    /// scanning every process.
    async fn find_by_activity_ids(&self, org: OrgId, activity_ids: &[ActivityId])
    -> Result<Vec<Process>, DomainError>;

    /// Persist the process and append its audit row atomically.
    async fn save_with_history(
        &self,
        process: Process,
        history: ProcessHistory
    ) -> Result<(Process, ProcessHistory), DomainError>;

    /// Remove all history rows of the process, then the process itself.
    async fn delete_with_history(&self, id: ProcessId) -> Result<(), DomainError>;
}

/// Port for reading the audit trail
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// History rows of a process, newest first
    async fn find_all_by_process(&self, id: ProcessId) -> Result<Vec<ProcessHistory>, DomainError>;
}

/// Port for process role records
#[async_trait]
pub trait ProcessRoleStore: Send + Sync {
    async fn find_by_id(&self, id: RoleId) -> Result<Option<ProcessRole>, DomainError>;

    async fn find_all_by_org(&self, org: OrgId) -> Result<Vec<ProcessRole>, DomainError>;

    async fn save(&self, role: ProcessRole) -> Result<ProcessRole, DomainError>;

    async fn delete(&self, id: RoleId) -> Result<(), DomainError>;
}

/// Port for activity-role link rows
#[async_trait]
pub trait ActivityRoleLinkStore: Send + Sync {
    async fn save(&self, link: ActivityRoleLink) -> Result<ActivityRoleLink, DomainError>;

    async fn delete(&self, id: LinkId) -> Result<(), DomainError>;

    async fn find_all_by_role(&self, role: RoleId) -> Result<Vec<ActivityRoleLink>, DomainError>;

    /// Referential-integrity probe guarding role deletion
    async fn exists_by_role(&self, role: RoleId) -> Result<bool, DomainError>;

    /// Uniqueness probe for the (activity, role) pair
    async fn exists_pair(&self, activity: ActivityId, role: RoleId) -> Result<bool, DomainError>;
}

/// Port for the shared reference entities processes point at
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn activity(&self, id: ActivityId) -> Result<Option<Activity>, DomainError>;

    async fn arch(&self, id: ArchId) -> Result<Option<Arch>, DomainError>;

    async fn gateway(&self, id: GatewayId) -> Result<Option<Gateway>, DomainError>;

    async fn save_activity(&self, activity: Activity) -> Result<Activity, DomainError>;

    async fn save_arch(&self, arch: Arch) -> Result<Arch, DomainError>;

    async fn save_gateway(&self, gateway: Gateway) -> Result<Gateway, DomainError>;
}
