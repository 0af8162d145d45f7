//! In-memory store implementation
//!
//! All tables live behind a single `RwLock`, which is what makes the combined
//! save-plus-history and cascade-delete calls atomic. Suitable for
//! development and tests; data is lost when the process exits.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::{
        Activity, ActivityRoleLink, Arch, DomainError, Gateway, Organization, Persona, Process, ProcessHistory,
        ProcessRole,
        id::{ActivityId, ArchId, GatewayId, LinkId, OrgId, PersonaId, ProcessId, RoleId}
    },
    port::store::{
        ActivityRoleLinkStore, HistoryStore, OrganizationStore, PersonaStore, ProcessRoleStore, ProcessStore,
        ReferenceStore
    }
};

/// All tables plus the shared id sequence
#[derive(Debug, Default)]
struct Tables {
    organizations: HashMap<u64, Organization>,
    personas:      HashMap<u64, Persona>,
    processes:     HashMap<u64, Process>,
    /// History rows per process id, oldest first
    history:       HashMap<u64, Vec<ProcessHistory>>,
    roles:         HashMap<u64, ProcessRole>,
    links:         HashMap<u64, ActivityRoleLink>,
    activities:    HashMap<u64, Activity>,
    arches:        HashMap<u64, Arch>,
    gateways:      HashMap<u64, Gateway>,
    /// activity id -> ids of processes referencing it, kept current on every
    /// process save/delete so where-used never scans the process table
    activity_idx:  HashMap<u64, BTreeSet<u64>>,
    seq:           u64
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Allocate a fresh id, or reserve an explicitly supplied one so later
    /// allocations never collide with it
    fn claim_id(&mut self, id: u64) -> u64 {
        if id == 0 {
            self.next_id()
        } else {
            self.seq = self.seq.max(id);
            id
        }
    }

    fn index_process(&mut self, process: &Process) {
        for activity in &process.activity_ids {
            self.activity_idx.entry(activity.0).or_default().insert(process.id.0);
        }
    }

    fn unindex_process(&mut self, process: &Process) {
        for activity in &process.activity_ids {
            if let Some(entry) = self.activity_idx.get_mut(&activity.0) {
                entry.remove(&process.id.0);
                if entry.is_empty() {
                    self.activity_idx.remove(&activity.0);
                }
            }
        }
    }
}

/// In-memory implementation of every storage port
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self { tables: Arc::new(RwLock::new(Tables::default())) }
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn find_by_id(&self, id: OrgId) -> Result<Option<Organization>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.organizations.get(&id.0).cloned())
    }

    async fn save(&self, mut org: Organization) -> Result<Organization, DomainError> {
        let mut tables = self.tables.write().await;
        org.id = OrgId(tables.claim_id(org.id.0));
        tables.organizations.insert(org.id.0, org.clone());
        Ok(org)
    }
}

#[async_trait]
impl PersonaStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Persona>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.personas.values().find(|p| p.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn find_by_id(&self, id: PersonaId) -> Result<Option<Persona>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.personas.get(&id.0).cloned())
    }

    async fn save(&self, mut persona: Persona) -> Result<Persona, DomainError> {
        let mut tables = self.tables.write().await;

        // Email is unique case-insensitively across personas
        let taken = tables
            .personas
            .values()
            .any(|p| p.id != persona.id && p.email.eq_ignore_ascii_case(&persona.email));
        if taken {
            return Err(DomainError::Conflict(format!("email {} is already registered", persona.email)));
        }

        persona.id = PersonaId(tables.claim_id(persona.id.0));
        tables.personas.insert(persona.id.0, persona.clone());
        Ok(persona)
    }

    async fn delete(&self, id: PersonaId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables.personas.remove(&id.0);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Persona>, DomainError> {
        let tables = self.tables.read().await;
        let mut personas: Vec<Persona> = tables.personas.values().cloned().collect();
        personas.sort_by_key(|p| p.id);
        Ok(personas)
    }
}

#[async_trait]
impl ProcessStore for InMemoryStore {
    async fn find_by_id(&self, id: ProcessId) -> Result<Option<Process>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.processes.get(&id.0).cloned())
    }

    async fn find_all_by_org(&self, org: OrgId) -> Result<Vec<Process>, DomainError> {
        let tables = self.tables.read().await;
        let mut processes: Vec<Process> = tables.processes.values().filter(|p| p.organization == org).cloned().collect();
        processes.sort_by_key(|p| p.id);
        Ok(processes)
    }

    async fn find_by_activity_ids(
        &self,
        org: OrgId,
        activity_ids: &[ActivityId]
    ) -> Result<Vec<Process>, DomainError> {
        let tables = self.tables.read().await;

        let mut process_ids = BTreeSet::new();
        for activity in activity_ids {
            if let Some(entry) = tables.activity_idx.get(&activity.0) {
                process_ids.extend(entry.iter().copied());
            }
        }

        let processes = process_ids
            .into_iter()
            .filter_map(|id| tables.processes.get(&id))
            .filter(|p| p.organization == org)
            .cloned()
            .collect();
        Ok(processes)
    }

    async fn save_with_history(
        &self,
        mut process: Process,
        mut history: ProcessHistory
    ) -> Result<(Process, ProcessHistory), DomainError> {
        let mut tables = self.tables.write().await;

        if let Some(previous) = tables.processes.get(&process.id.0).cloned() {
            tables.unindex_process(&previous);
        }
        process.id = ProcessId(tables.claim_id(process.id.0));

        history.process_id = process.id;
        history.id = crate::domain::HistoryId(tables.claim_id(history.id.0));

        tables.processes.insert(process.id.0, process.clone());
        tables.index_process(&process);
        tables.history.entry(process.id.0).or_default().push(history.clone());

        Ok((process, history))
    }

    async fn delete_with_history(&self, id: ProcessId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables.history.remove(&id.0);
        if let Some(process) = tables.processes.remove(&id.0) {
            tables.unindex_process(&process);
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn find_all_by_process(&self, id: ProcessId) -> Result<Vec<ProcessHistory>, DomainError> {
        let tables = self.tables.read().await;
        let mut rows = tables.history.get(&id.0).cloned().unwrap_or_default();
        rows.reverse();
        Ok(rows)
    }
}

#[async_trait]
impl ProcessRoleStore for InMemoryStore {
    async fn find_by_id(&self, id: RoleId) -> Result<Option<ProcessRole>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.get(&id.0).cloned())
    }

    async fn find_all_by_org(&self, org: OrgId) -> Result<Vec<ProcessRole>, DomainError> {
        let tables = self.tables.read().await;
        let mut roles: Vec<ProcessRole> = tables.roles.values().filter(|r| r.organization == org).cloned().collect();
        roles.sort_by_key(|r| r.id);
        Ok(roles)
    }

    async fn save(&self, mut role: ProcessRole) -> Result<ProcessRole, DomainError> {
        let mut tables = self.tables.write().await;
        role.id = RoleId(tables.claim_id(role.id.0));
        tables.roles.insert(role.id.0, role.clone());
        Ok(role)
    }

    async fn delete(&self, id: RoleId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables.roles.remove(&id.0);
        Ok(())
    }
}

#[async_trait]
impl ActivityRoleLinkStore for InMemoryStore {
    async fn save(&self, mut link: ActivityRoleLink) -> Result<ActivityRoleLink, DomainError> {
        let mut tables = self.tables.write().await;
        link.id = LinkId(tables.claim_id(link.id.0));
        tables.links.insert(link.id.0, link.clone());
        Ok(link)
    }

    async fn delete(&self, id: LinkId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables.links.remove(&id.0);
        Ok(())
    }

    async fn find_all_by_role(&self, role: RoleId) -> Result<Vec<ActivityRoleLink>, DomainError> {
        let tables = self.tables.read().await;
        let mut links: Vec<ActivityRoleLink> = tables.links.values().filter(|l| l.role_id == role).cloned().collect();
        links.sort_by_key(|l| l.id);
        Ok(links)
    }

    async fn exists_by_role(&self, role: RoleId) -> Result<bool, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.links.values().any(|l| l.role_id == role))
    }

    async fn exists_pair(&self, activity: ActivityId, role: RoleId) -> Result<bool, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.links.values().any(|l| l.activity_id == activity && l.role_id == role))
    }
}

#[async_trait]
impl ReferenceStore for InMemoryStore {
    async fn activity(&self, id: ActivityId) -> Result<Option<Activity>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.activities.get(&id.0).cloned())
    }

    async fn arch(&self, id: ArchId) -> Result<Option<Arch>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.arches.get(&id.0).cloned())
    }

    async fn gateway(&self, id: GatewayId) -> Result<Option<Gateway>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.gateways.get(&id.0).cloned())
    }

    async fn save_activity(&self, mut activity: Activity) -> Result<Activity, DomainError> {
        let mut tables = self.tables.write().await;
        activity.id = ActivityId(tables.claim_id(activity.id.0));
        tables.activities.insert(activity.id.0, activity.clone());
        Ok(activity)
    }

    async fn save_arch(&self, mut arch: Arch) -> Result<Arch, DomainError> {
        let mut tables = self.tables.write().await;
        arch.id = ArchId(tables.claim_id(arch.id.0));
        tables.arches.insert(arch.id.0, arch.clone());
        Ok(arch)
    }

    async fn save_gateway(&self, mut gateway: Gateway) -> Result<Gateway, DomainError> {
        let mut tables = self.tables.write().await;
        gateway.id = GatewayId(tables.claim_id(gateway.id.0));
        tables.gateways.insert(gateway.id.0, gateway.clone());
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeLabel, HistoryId, ProcessStatus};

    fn draft_process(org: u64, activities: &[u64]) -> Process {
        Process {
            id:           ProcessId::UNASSIGNED,
            name:         "Onboarding".to_string(),
            description:  "New hire onboarding".to_string(),
            category:     "HR".to_string(),
            status:       ProcessStatus::Draft,
            organization: OrgId(org),
            activity_ids: activities.iter().copied().map(ActivityId).collect(),
            arch_ids:     vec![],
            gateway_ids:  vec![]
        }
    }

    fn row(label: ChangeLabel) -> ProcessHistory {
        ProcessHistory {
            id:          HistoryId::UNASSIGNED,
            process_id:  ProcessId::UNASSIGNED,
            actor:       Some("ana@example.com".to_string()),
            label,
            status:      ProcessStatus::Draft,
            description: "New hire onboarding".to_string(),
            created_at:  chrono::Utc::now()
        }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_appends_history() {
        let store = InMemoryStore::new();

        let (process, history) =
            store.save_with_history(draft_process(1, &[]), row(ChangeLabel::Created)).await.unwrap();
        assert!(process.id.is_assigned());
        assert!(history.id.is_assigned());
        assert_eq!(history.process_id, process.id);

        let rows = store.find_all_by_process(process.id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn history_comes_back_newest_first() {
        let store = InMemoryStore::new();
        let (process, _) = store.save_with_history(draft_process(1, &[]), row(ChangeLabel::Created)).await.unwrap();
        store.save_with_history(process.clone(), row(ChangeLabel::Updated)).await.unwrap();

        let rows = store.find_all_by_process(process.id).await.unwrap();
        assert_eq!(rows[0].label, ChangeLabel::Updated);
        assert_eq!(rows[1].label, ChangeLabel::Created);
    }

    #[tokio::test]
    async fn activity_index_tracks_saves_and_deletes() {
        let store = InMemoryStore::new();
        let (p1, _) = store.save_with_history(draft_process(1, &[2, 3]), row(ChangeLabel::Created)).await.unwrap();
        let (p2, _) = store.save_with_history(draft_process(1, &[4, 5]), row(ChangeLabel::Created)).await.unwrap();

        let hits = store.find_by_activity_ids(OrgId(1), &[ActivityId(2)]).await.unwrap();
        assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), vec![p1.id]);

        // Re-save with a different activity set; the old entries must go away
        let mut p1b = p1.clone();
        p1b.activity_ids = vec![ActivityId(7)];
        store.save_with_history(p1b, row(ChangeLabel::Updated)).await.unwrap();
        assert!(store.find_by_activity_ids(OrgId(1), &[ActivityId(2)]).await.unwrap().is_empty());

        store.delete_with_history(p2.id).await.unwrap();
        assert!(store.find_by_activity_ids(OrgId(1), &[ActivityId(4)]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn activity_index_is_org_scoped() {
        let store = InMemoryStore::new();
        store.save_with_history(draft_process(1, &[9]), row(ChangeLabel::Created)).await.unwrap();
        let (other_org, _) =
            store.save_with_history(draft_process(2, &[9]), row(ChangeLabel::Created)).await.unwrap();

        let hits = store.find_by_activity_ids(OrgId(2), &[ActivityId(9)]).await.unwrap();
        assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), vec![other_org.id]);
    }

    #[tokio::test]
    async fn delete_with_history_removes_everything() {
        let store = InMemoryStore::new();
        let (process, _) = store.save_with_history(draft_process(1, &[1]), row(ChangeLabel::Created)).await.unwrap();

        store.delete_with_history(process.id).await.unwrap();
        assert!(ProcessStore::find_by_id(&store, process.id).await.unwrap().is_none());
        assert!(store.find_all_by_process(process.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn explicit_ids_reserve_the_sequence() {
        let store = InMemoryStore::new();
        store.save_activity(Activity { id: ActivityId(1), name: "intake".to_string() }).await.unwrap();

        let review =
            store.save_activity(Activity { id: ActivityId::UNASSIGNED, name: "review".to_string() }).await.unwrap();
        assert_eq!(review.id, ActivityId(2));

        let intake = store.activity(ActivityId(1)).await.unwrap().unwrap();
        assert_eq!(intake.name, "intake");
    }

    #[tokio::test]
    async fn persona_email_lookup_ignores_case_and_rejects_duplicates() {
        let store = InMemoryStore::new();
        let persona = Persona {
            id:           PersonaId::UNASSIGNED,
            name:         "Ana".to_string(),
            email:        "Ana@Example.com".to_string(),
            role:         crate::domain::Role::Editor,
            organization: Some(OrgId(1))
        };
        PersonaStore::save(&store, persona.clone()).await.unwrap();

        assert!(store.find_by_email("ana@example.COM").await.unwrap().is_some());

        let mut duplicate = persona;
        duplicate.name = "Other".to_string();
        let err = PersonaStore::save(&store, duplicate).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
