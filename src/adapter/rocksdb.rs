//! RocksDB-backed store implementation
//!
//! Persistent storage across restarts. Rows are JSON values under
//! per-entity key prefixes; combined writes go through a `WriteBatch`, which
//! is what makes the save-plus-history and cascade-delete calls atomic.
//!
//! Key layout:
//! - `org:{id}` / `persona:{id}` / `process:{id}` / `role:{id}` /
//!   `link:{id}` / `activity:{id}` / `arch:{id}` / `gateway:{id}` -> JSON row
//! - `persona_email:{lowercased email}` -> persona id
//! - `history:{process id}` -> Vec<ProcessHistory> (oldest first)
//! - `activity_idx:{activity id}` -> Vec<process id> (where-used index)
//! - `seq` -> id sequence high-water mark

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering}
    }
};

use async_trait::async_trait;
use rocksdb::{DB, Options, WriteBatch};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    adapter::memory::InMemoryStore,
    domain::{
        Activity, ActivityRoleLink, Arch, DomainError, Gateway, HistoryId, Organization, Persona, Process,
        ProcessHistory, ProcessRole,
        id::{ActivityId, ArchId, GatewayId, LinkId, OrgId, PersonaId, ProcessId, RoleId}
    },
    port::store::{
        ActivityRoleLinkStore, HistoryStore, OrganizationStore, PersonaStore, ProcessRoleStore, ProcessStore,
        ReferenceStore
    }
};

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
pub enum StoreBackend {
    #[serde(rename = "inmemory")]
    #[value(name = "inmemory")]
    InMemory,
    #[serde(rename = "rocksdb")]
    #[value(name = "rocksdb")]
    RocksDb
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::InMemory => "inmemory",
            StoreBackend::RocksDb => "rocksdb"
        }
    }
}

const SEQ_KEY: &[u8] = b"seq";

fn persistence(err: impl std::fmt::Display) -> DomainError {
    DomainError::Persistence(err.to_string())
}

fn get_json<T: DeserializeOwned>(db: &DB, key: &str) -> Result<Option<T>, DomainError> {
    match db.get(key.as_bytes()) {
        Ok(Some(bytes)) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Ok(None) => Ok(None),
        Err(e) => Err(persistence(e))
    }
}

fn put_json<T: Serialize>(batch: &mut WriteBatch, key: &str, value: &T) -> Result<(), DomainError> {
    batch.put(key.as_bytes(), serde_json::to_vec(value)?);
    Ok(())
}

/// All rows under `prefix:`, decoded
fn scan_prefix<T: DeserializeOwned>(db: &DB, prefix: &str) -> Result<Vec<T>, DomainError> {
    let mut rows = Vec::new();
    let iter = db.iterator(rocksdb::IteratorMode::From(prefix.as_bytes(), rocksdb::Direction::Forward));
    for item in iter {
        let (key, value) = item.map_err(persistence)?;
        if !key.starts_with(prefix.as_bytes()) {
            break;
        }
        rows.push(serde_json::from_slice(&value)?);
    }
    Ok(rows)
}

/// RocksDB implementation of every storage port
pub struct RocksDbStore {
    db:         Arc<DB>,
    /// Next-id sequence, initialized from the `seq` key and persisted with
    /// every batch that allocates ids
    seq:        Arc<AtomicU64>,
    /// Serializes seq persistence with batch commits; without it two
    /// concurrent saves could commit a stale lower counter last
    write_lock: Arc<Mutex<()>>
}

impl RocksDbStore {
    /// Creates a store from an existing shared DB instance.
    ///
    /// The DB is shared process-wide (RocksDB locks its directory to a
    /// single process), so the factory hands out clones of one `Arc<DB>`.
    pub fn from_db(db: Arc<DB>) -> Result<Self, DomainError> {
        let current = match db.get(SEQ_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes)?,
            Ok(None) => 0u64,
            Err(e) => return Err(persistence(e))
        };
        Ok(Self { db, seq: Arc::new(AtomicU64::new(current)), write_lock: Arc::new(Mutex::new(())) })
    }

    fn next_id(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Allocate a fresh id, or reserve an explicitly supplied one so later
    /// allocations never collide with it
    fn claim_id(&self, id: u64) -> u64 {
        if id == 0 {
            self.next_id()
        } else {
            self.seq.fetch_max(id, Ordering::SeqCst);
            id
        }
    }

    /// Commit a batch together with the sequence high-water mark.
    ///
    /// The counter is re-read under the lock and only its maximum is
    /// persisted: batches commit in arbitrary order across blocking threads,
    /// and a stale lower value landing last would hand out already-used ids
    /// after a reopen.
    fn commit(
        db: &DB,
        lock: &Mutex<()>,
        seq: &AtomicU64,
        mut batch: WriteBatch
    ) -> Result<(), DomainError> {
        let _guard = lock.lock().map_err(|_| DomainError::Persistence("sequence lock poisoned".to_string()))?;
        let stored: u64 = match db.get(SEQ_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes)?,
            Ok(None) => 0,
            Err(e) => return Err(persistence(e))
        };
        let current = seq.load(Ordering::SeqCst).max(stored);
        batch.put(SEQ_KEY, serde_json::to_vec(&current)?);
        db.write(batch).map_err(persistence)
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<DB>) -> Result<T, DomainError> + Send + 'static
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || work(db)).await.map_err(persistence)?
    }

    /// Generic save for the simple keyed entities
    async fn save_row<T>(&self, prefix: &'static str, id: u64, row: T) -> Result<T, DomainError>
    where
        T: Serialize + Send + 'static
    {
        let mut batch = WriteBatch::default();
        put_json(&mut batch, &format!("{}:{}", prefix, id), &row)?;
        let (lock, seq) = (self.write_lock.clone(), self.seq.clone());
        self.blocking(move |db| {
            Self::commit(&db, &lock, &seq, batch)?;
            Ok(row)
        })
        .await
    }

    fn remove_from_activity_index(db: &DB, batch: &mut WriteBatch, process: &Process) -> Result<(), DomainError> {
        for activity in &process.activity_ids {
            let key = format!("activity_idx:{}", activity.0);
            let mut ids: Vec<u64> = get_json(db, &key)?.unwrap_or_default();
            ids.retain(|id| *id != process.id.0);
            if ids.is_empty() {
                batch.delete(key.as_bytes());
            } else {
                put_json(batch, &key, &ids)?;
            }
        }
        Ok(())
    }

    fn add_to_activity_index(db: &DB, batch: &mut WriteBatch, process: &Process) -> Result<(), DomainError> {
        for activity in &process.activity_ids {
            let key = format!("activity_idx:{}", activity.0);
            let mut ids: Vec<u64> = get_json(db, &key)?.unwrap_or_default();
            if !ids.contains(&process.id.0) {
                ids.push(process.id.0);
                ids.sort_unstable();
            }
            put_json(batch, &key, &ids)?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrganizationStore for RocksDbStore {
    async fn find_by_id(&self, id: OrgId) -> Result<Option<Organization>, DomainError> {
        self.blocking(move |db| get_json(&db, &format!("org:{}", id.0))).await
    }

    async fn save(&self, mut org: Organization) -> Result<Organization, DomainError> {
        org.id = OrgId(self.claim_id(org.id.0));
        self.save_row("org", org.id.0, org).await
    }
}

#[async_trait]
impl PersonaStore for RocksDbStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Persona>, DomainError> {
        let key = format!("persona_email:{}", email.to_lowercase());
        self.blocking(move |db| {
            let Some(id) = get_json::<u64>(&db, &key)? else {
                return Ok(None);
            };
            get_json(&db, &format!("persona:{}", id))
        })
        .await
    }

    async fn find_by_id(&self, id: PersonaId) -> Result<Option<Persona>, DomainError> {
        self.blocking(move |db| get_json(&db, &format!("persona:{}", id.0))).await
    }

    async fn save(&self, mut persona: Persona) -> Result<Persona, DomainError> {
        persona.id = PersonaId(self.claim_id(persona.id.0));
        let mut batch = WriteBatch::default();
        let (lock, seq) = (self.write_lock.clone(), self.seq.clone());

        self.blocking(move |db| {
            let email_key = format!("persona_email:{}", persona.email.to_lowercase());
            if let Some(owner) = get_json::<u64>(&db, &email_key)?
                && owner != persona.id.0
            {
                return Err(DomainError::Conflict(format!("email {} is already registered", persona.email)));
            }

            // Drop the old email index entry when the address changed
            if let Some(previous) = get_json::<Persona>(&db, &format!("persona:{}", persona.id.0))?
                && !previous.email.eq_ignore_ascii_case(&persona.email)
            {
                batch.delete(format!("persona_email:{}", previous.email.to_lowercase()).as_bytes());
            }

            put_json(&mut batch, &format!("persona:{}", persona.id.0), &persona)?;
            put_json(&mut batch, &email_key, &persona.id.0)?;
            Self::commit(&db, &lock, &seq, batch)?;
            Ok(persona)
        })
        .await
    }

    async fn delete(&self, id: PersonaId) -> Result<(), DomainError> {
        self.blocking(move |db| {
            let mut batch = WriteBatch::default();
            if let Some(persona) = get_json::<Persona>(&db, &format!("persona:{}", id.0))? {
                batch.delete(format!("persona_email:{}", persona.email.to_lowercase()).as_bytes());
            }
            batch.delete(format!("persona:{}", id.0).as_bytes());
            db.write(batch).map_err(persistence)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Persona>, DomainError> {
        self.blocking(move |db| {
            let mut personas: Vec<Persona> = scan_prefix(&db, "persona:")?;
            personas.sort_by_key(|p| p.id);
            Ok(personas)
        })
        .await
    }
}

#[async_trait]
impl ProcessStore for RocksDbStore {
    async fn find_by_id(&self, id: ProcessId) -> Result<Option<Process>, DomainError> {
        self.blocking(move |db| get_json(&db, &format!("process:{}", id.0))).await
    }

    async fn find_all_by_org(&self, org: OrgId) -> Result<Vec<Process>, DomainError> {
        self.blocking(move |db| {
            let mut processes: Vec<Process> = scan_prefix(&db, "process:")?;
            processes.retain(|p| p.organization == org);
            processes.sort_by_key(|p| p.id);
            Ok(processes)
        })
        .await
    }

    async fn find_by_activity_ids(
        &self,
        org: OrgId,
        activity_ids: &[ActivityId]
    ) -> Result<Vec<Process>, DomainError> {
        let activity_ids = activity_ids.to_vec();
        self.blocking(move |db| {
            let mut process_ids = std::collections::BTreeSet::new();
            for activity in &activity_ids {
                let ids: Vec<u64> = get_json(&db, &format!("activity_idx:{}", activity.0))?.unwrap_or_default();
                process_ids.extend(ids);
            }

            let mut processes = Vec::new();
            for id in process_ids {
                if let Some(process) = get_json::<Process>(&db, &format!("process:{}", id))?
                    && process.organization == org
                {
                    processes.push(process);
                }
            }
            Ok(processes)
        })
        .await
    }

    async fn save_with_history(
        &self,
        mut process: Process,
        mut history: ProcessHistory
    ) -> Result<(Process, ProcessHistory), DomainError> {
        process.id = ProcessId(self.claim_id(process.id.0));
        history.process_id = process.id;
        history.id = HistoryId(self.claim_id(history.id.0));

        let mut batch = WriteBatch::default();
        let (lock, seq) = (self.write_lock.clone(), self.seq.clone());

        self.blocking(move |db| {
            if let Some(previous) = get_json::<Process>(&db, &format!("process:{}", process.id.0))? {
                Self::remove_from_activity_index(&db, &mut batch, &previous)?;
            }

            let history_key = format!("history:{}", process.id.0);
            let mut rows: Vec<ProcessHistory> = get_json(&db, &history_key)?.unwrap_or_default();
            rows.push(history.clone());

            put_json(&mut batch, &format!("process:{}", process.id.0), &process)?;
            put_json(&mut batch, &history_key, &rows)?;
            Self::add_to_activity_index(&db, &mut batch, &process)?;

            Self::commit(&db, &lock, &seq, batch)?;
            Ok((process, history))
        })
        .await
    }

    async fn delete_with_history(&self, id: ProcessId) -> Result<(), DomainError> {
        self.blocking(move |db| {
            let mut batch = WriteBatch::default();
            batch.delete(format!("history:{}", id.0).as_bytes());
            if let Some(process) = get_json::<Process>(&db, &format!("process:{}", id.0))? {
                Self::remove_from_activity_index(&db, &mut batch, &process)?;
            }
            batch.delete(format!("process:{}", id.0).as_bytes());
            db.write(batch).map_err(persistence)
        })
        .await
    }
}

#[async_trait]
impl HistoryStore for RocksDbStore {
    async fn find_all_by_process(&self, id: ProcessId) -> Result<Vec<ProcessHistory>, DomainError> {
        self.blocking(move |db| {
            let mut rows: Vec<ProcessHistory> =
                get_json(&db, &format!("history:{}", id.0))?.unwrap_or_default();
            rows.reverse();
            Ok(rows)
        })
        .await
    }
}

#[async_trait]
impl ProcessRoleStore for RocksDbStore {
    async fn find_by_id(&self, id: RoleId) -> Result<Option<ProcessRole>, DomainError> {
        self.blocking(move |db| get_json(&db, &format!("role:{}", id.0))).await
    }

    async fn find_all_by_org(&self, org: OrgId) -> Result<Vec<ProcessRole>, DomainError> {
        self.blocking(move |db| {
            let mut roles: Vec<ProcessRole> = scan_prefix(&db, "role:")?;
            roles.retain(|r| r.organization == org);
            roles.sort_by_key(|r| r.id);
            Ok(roles)
        })
        .await
    }

    async fn save(&self, mut role: ProcessRole) -> Result<ProcessRole, DomainError> {
        role.id = RoleId(self.claim_id(role.id.0));
        self.save_row("role", role.id.0, role).await
    }

    async fn delete(&self, id: RoleId) -> Result<(), DomainError> {
        self.blocking(move |db| db.delete(format!("role:{}", id.0).as_bytes()).map_err(persistence)).await
    }
}

#[async_trait]
impl ActivityRoleLinkStore for RocksDbStore {
    async fn save(&self, mut link: ActivityRoleLink) -> Result<ActivityRoleLink, DomainError> {
        link.id = LinkId(self.claim_id(link.id.0));
        self.save_row("link", link.id.0, link).await
    }

    async fn delete(&self, id: LinkId) -> Result<(), DomainError> {
        self.blocking(move |db| db.delete(format!("link:{}", id.0).as_bytes()).map_err(persistence)).await
    }

    async fn find_all_by_role(&self, role: RoleId) -> Result<Vec<ActivityRoleLink>, DomainError> {
        self.blocking(move |db| {
            let mut links: Vec<ActivityRoleLink> = scan_prefix(&db, "link:")?;
            links.retain(|l| l.role_id == role);
            links.sort_by_key(|l| l.id);
            Ok(links)
        })
        .await
    }

    async fn exists_by_role(&self, role: RoleId) -> Result<bool, DomainError> {
        Ok(!self.find_all_by_role(role).await?.is_empty())
    }

    async fn exists_pair(&self, activity: ActivityId, role: RoleId) -> Result<bool, DomainError> {
        Ok(self.find_all_by_role(role).await?.iter().any(|l| l.activity_id == activity))
    }
}

#[async_trait]
impl ReferenceStore for RocksDbStore {
    async fn activity(&self, id: ActivityId) -> Result<Option<Activity>, DomainError> {
        self.blocking(move |db| get_json(&db, &format!("activity:{}", id.0))).await
    }

    async fn arch(&self, id: ArchId) -> Result<Option<Arch>, DomainError> {
        self.blocking(move |db| get_json(&db, &format!("arch:{}", id.0))).await
    }

    async fn gateway(&self, id: GatewayId) -> Result<Option<Gateway>, DomainError> {
        self.blocking(move |db| get_json(&db, &format!("gateway:{}", id.0))).await
    }

    async fn save_activity(&self, mut activity: Activity) -> Result<Activity, DomainError> {
        activity.id = ActivityId(self.claim_id(activity.id.0));
        self.save_row("activity", activity.id.0, activity).await
    }

    async fn save_arch(&self, mut arch: Arch) -> Result<Arch, DomainError> {
        arch.id = ArchId(self.claim_id(arch.id.0));
        self.save_row("arch", arch.id.0, arch).await
    }

    async fn save_gateway(&self, mut gateway: Gateway) -> Result<Gateway, DomainError> {
        gateway.id = GatewayId(self.claim_id(gateway.id.0));
        self.save_row("gateway", gateway.id.0, gateway).await
    }
}

/// Bundle of port handles sharing one concrete store
#[derive(Clone)]
pub struct StoreHandle {
    pub organizations: Arc<dyn OrganizationStore>,
    pub personas:      Arc<dyn PersonaStore>,
    pub processes:     Arc<dyn ProcessStore>,
    pub history:       Arc<dyn HistoryStore>,
    pub roles:         Arc<dyn ProcessRoleStore>,
    pub links:         Arc<dyn ActivityRoleLinkStore>,
    pub references:    Arc<dyn ReferenceStore>
}

impl StoreHandle {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: OrganizationStore
            + PersonaStore
            + ProcessStore
            + HistoryStore
            + ProcessRoleStore
            + ActivityRoleLinkStore
            + ReferenceStore
            + 'static
    {
        Self {
            organizations: store.clone(),
            personas:      store.clone(),
            processes:     store.clone(),
            history:       store.clone(),
            roles:         store.clone(),
            links:         store.clone(),
            references:    store
        }
    }
}

/// Shared RocksDB instance holder
static DB_INSTANCE: once_cell::sync::OnceCell<Arc<DB>> = once_cell::sync::OnceCell::new();

/// Factory for creating stores based on configuration
pub struct StoreFactory;

impl StoreFactory {
    /// Creates a store bundle, opening the shared DB on first use
    pub fn create(backend: StoreBackend, db_path: Option<&Path>) -> Result<StoreHandle, DomainError> {
        match backend {
            StoreBackend::InMemory => Ok(StoreHandle::from_store(Arc::new(InMemoryStore::new()))),
            StoreBackend::RocksDb => {
                let path: PathBuf = db_path
                    .ok_or_else(|| DomainError::Persistence("rocksdb backend requires a db path".to_string()))?
                    .to_path_buf();

                let db = DB_INSTANCE.get_or_try_init(|| {
                    let mut opts = Options::default();
                    opts.create_if_missing(true);
                    opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                    DB::open(&opts, &path).map(Arc::new).map_err(persistence)
                })?;

                Ok(StoreHandle::from_store(Arc::new(RocksDbStore::from_db(db.clone())?)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeLabel, ProcessStatus, Role};

    fn open_store(dir: &tempfile::TempDir) -> RocksDbStore {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, dir.path()).expect("open rocksdb");
        RocksDbStore::from_db(Arc::new(db)).expect("init store")
    }

    fn draft_process(org: u64, activities: &[u64]) -> Process {
        Process {
            id:           ProcessId::UNASSIGNED,
            name:         "Billing".to_string(),
            description:  "Invoice run".to_string(),
            category:     "Finance".to_string(),
            status:       ProcessStatus::Draft,
            organization: OrgId(org),
            activity_ids: activities.iter().copied().map(ActivityId).collect(),
            arch_ids:     vec![],
            gateway_ids:  vec![]
        }
    }

    fn row() -> ProcessHistory {
        ProcessHistory {
            id:          HistoryId::UNASSIGNED,
            process_id:  ProcessId::UNASSIGNED,
            actor:       Some("ana@example.com".to_string()),
            label:       ChangeLabel::Created,
            status:      ProcessStatus::Draft,
            description: "Invoice run".to_string(),
            created_at:  chrono::Utc::now()
        }
    }

    #[tokio::test]
    async fn process_round_trip_with_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let (process, history) = store.save_with_history(draft_process(1, &[2]), row()).await.unwrap();
        assert!(process.id.is_assigned());
        assert_eq!(history.process_id, process.id);

        let loaded = ProcessStore::find_by_id(&store, process.id).await.unwrap().unwrap();
        assert_eq!(loaded, process);
        assert_eq!(store.find_all_by_process(process.id).await.unwrap().len(), 1);

        let by_activity = store.find_by_activity_ids(OrgId(1), &[ActivityId(2)]).await.unwrap();
        assert_eq!(by_activity, vec![loaded]);
    }

    #[tokio::test]
    async fn hard_delete_cascades_history_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let (process, _) = store.save_with_history(draft_process(1, &[5]), row()).await.unwrap();
        store.delete_with_history(process.id).await.unwrap();

        assert!(ProcessStore::find_by_id(&store, process.id).await.unwrap().is_none());
        assert!(store.find_all_by_process(process.id).await.unwrap().is_empty());
        assert!(store.find_by_activity_ids(OrgId(1), &[ActivityId(5)]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persona_email_index_survives_and_stays_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let ana = Persona {
            id:           PersonaId::UNASSIGNED,
            name:         "Ana".to_string(),
            email:        "Ana@Example.com".to_string(),
            role:         Role::Admin,
            organization: Some(OrgId(1))
        };
        let saved = PersonaStore::save(&store, ana).await.unwrap();

        let found = store.find_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);

        let intruder = Persona {
            id:           PersonaId::UNASSIGNED,
            name:         "Eve".to_string(),
            email:        "ANA@example.com".to_string(),
            role:         Role::Viewer,
            organization: Some(OrgId(2))
        };
        let err = PersonaStore::save(&store, intruder.clone()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Deletion clears the email index, so the address can be reused
        PersonaStore::delete(&store, saved.id).await.unwrap();
        assert!(store.find_by_email("ana@example.com").await.unwrap().is_none());
        PersonaStore::save(&store, intruder).await.unwrap();
    }

    #[tokio::test]
    async fn explicit_ids_reserve_the_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store.save_activity(Activity { id: ActivityId(1), name: "intake".to_string() }).await.unwrap();
        let review =
            store.save_activity(Activity { id: ActivityId::UNASSIGNED, name: "review".to_string() }).await.unwrap();
        assert_eq!(review.id, ActivityId(2));

        let intake = store.activity(ActivityId(1)).await.unwrap().unwrap();
        assert_eq!(intake.name, "intake");
    }

    #[tokio::test]
    async fn concurrent_saves_persist_the_highest_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let highest = {
            let store = Arc::new(open_store(&dir));
            let mut handles = Vec::new();
            for i in 0..8 {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    OrganizationStore::save(
                        store.as_ref(),
                        Organization { id: OrgId::UNASSIGNED, name: format!("org-{}", i) }
                    )
                    .await
                    .unwrap()
                    .id
                    .0
                }));
            }
            let mut highest = 0;
            for handle in handles {
                highest = highest.max(handle.await.unwrap());
            }
            highest
        };

        // After reopen the counter must sit at the high-water mark, so the
        // next allocation never reuses an id handed out before
        let store = open_store(&dir);
        let org = OrganizationStore::save(
            &store,
            Organization { id: OrgId::UNASSIGNED, name: "late".to_string() }
        )
        .await
        .unwrap();
        assert!(org.id.0 > highest);
    }

    #[tokio::test]
    async fn sequence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let first_id = {
            let store = open_store(&dir);
            let org = OrganizationStore::save(
                &store,
                Organization { id: OrgId::UNASSIGNED, name: "Acme".to_string() }
            )
            .await
            .unwrap();
            org.id.0
        };

        let store = open_store(&dir);
        let org = OrganizationStore::save(
            &store,
            Organization { id: OrgId::UNASSIGNED, name: "Globex".to_string() }
        )
        .await
        .unwrap();
        assert!(org.id.0 > first_id);
    }
}
