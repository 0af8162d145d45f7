//! Process lifecycle engine
//!
//! Create, read, update, soft/hard delete and audit-trail reads for
//! processes, with the organization guard applied before every scoped access
//! and exactly one history row appended per successful mutation.

use std::sync::Arc;

use tracing::{Level, event};

use crate::{
    domain::{
        ChangeLabel, DomainError, EntityKind, NewProcess, Persona, Process, ProcessHistory, ProcessId,
        ProcessPatch, ProcessStatus, Role, guard,
        id::{ActivityId, ArchId, GatewayId}
    },
    port::store::{HistoryStore, ProcessStore, ReferenceStore}
};

/// Service for process lifecycle operations
pub struct ProcessService {
    processes:  Arc<dyn ProcessStore>,
    history:    Arc<dyn HistoryStore>,
    references: Arc<dyn ReferenceStore>
}

impl ProcessService {
    pub fn new(
        processes: Arc<dyn ProcessStore>,
        history: Arc<dyn HistoryStore>,
        references: Arc<dyn ReferenceStore>
    ) -> Self {
        Self { processes, history, references }
    }

    /// Create a process owned by the actor's organization.
    ///
    /// The organization always comes from the actor, never from the payload;
    /// status defaults to DRAFT; every referenced activity/arch/gateway id
    /// must exist.
    pub async fn create(&self, input: NewProcess, actor: &Persona) -> Result<Process, DomainError> {
        let org = guard::actor_org(actor)?;

        self.resolve_references(&input.activity_ids, &input.arch_ids, &input.gateway_ids).await?;

        let process = Process {
            id:           ProcessId::UNASSIGNED,
            name:         input.name,
            description:  input.description,
            category:     input.category,
            status:       input.status.unwrap_or_default(),
            organization: org,
            activity_ids: input.activity_ids,
            arch_ids:     input.arch_ids,
            gateway_ids:  input.gateway_ids
        };

        let row = ProcessHistory::snapshot(&process, Some(&actor.email), ChangeLabel::Created);
        let (process, _) = self.processes.save_with_history(process, row).await?;

        event!(Level::INFO, process_id = %process.id, org = %org, actor = %actor.email, "process created");
        Ok(process)
    }

    /// Load a process of the actor's organization.
    ///
    /// Absence and cross-org access are distinct errors here; the boundary
    /// renders both as "not found" so other tenants' ids are never confirmed
    /// to exist.
    pub async fn get(&self, id: ProcessId, actor: &Persona) -> Result<Process, DomainError> {
        let process = self
            .processes
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found(EntityKind::Process, id))?;
        guard::check_same_org(Some(process.organization), actor)?;
        Ok(process)
    }

    /// All processes of the actor's organization, optionally filtered by
    /// status. An actor without an organization gets an empty list, not an
    /// error.
    pub async fn list(&self, status: Option<ProcessStatus>, actor: &Persona) -> Result<Vec<Process>, DomainError> {
        let Some(org) = actor.organization else {
            return Ok(Vec::new());
        };

        let mut processes = self.processes.find_all_by_org(org).await?;
        if let Some(status) = status {
            processes.retain(|p| p.status == status);
        }
        Ok(processes)
    }

    /// Partial update: only fields present in the patch are overwritten, and
    /// a supplied reference list replaces the previous one after
    /// re-resolution.
    pub async fn update(&self, id: ProcessId, patch: ProcessPatch, actor: &Persona) -> Result<Process, DomainError> {
        let mut process = self.get(id, actor).await?;

        self.resolve_references(
            patch.activity_ids.as_deref().unwrap_or_default(),
            patch.arch_ids.as_deref().unwrap_or_default(),
            patch.gateway_ids.as_deref().unwrap_or_default()
        )
        .await?;

        if let Some(name) = patch.name {
            process.name = name;
        }
        if let Some(description) = patch.description {
            process.description = description;
        }
        if let Some(category) = patch.category {
            process.category = category;
        }
        if let Some(status) = patch.status {
            process.status = status;
        }
        if let Some(activity_ids) = patch.activity_ids {
            process.activity_ids = activity_ids;
        }
        if let Some(arch_ids) = patch.arch_ids {
            process.arch_ids = arch_ids;
        }
        if let Some(gateway_ids) = patch.gateway_ids {
            process.gateway_ids = gateway_ids;
        }

        let row = ProcessHistory::snapshot(&process, Some(&actor.email), ChangeLabel::Updated);
        let (process, _) = self.processes.save_with_history(process, row).await?;

        event!(Level::INFO, process_id = %process.id, actor = %actor.email, "process updated");
        Ok(process)
    }

    /// Delete a process.
    ///
    /// Hard delete requires ADMIN and cascades the audit trail before the
    /// process itself. Soft delete sets INACTIVE unconditionally - DRAFT and
    /// PUBLISHED collapse to the same path on purpose - and appends a history
    /// row.
    pub async fn delete(&self, id: ProcessId, hard: bool, actor: &Persona) -> Result<(), DomainError> {
        let mut process = self.get(id, actor).await?;

        if hard {
            if actor.role != Role::Admin {
                return Err(DomainError::Forbidden(
                    "only an ADMIN can permanently delete a process".to_string()
                ));
            }
            self.processes.delete_with_history(process.id).await?;
            event!(Level::INFO, process_id = %id, actor = %actor.email, "process hard-deleted");
        } else {
            process.status = ProcessStatus::Inactive;
            let row = ProcessHistory::snapshot(&process, Some(&actor.email), ChangeLabel::SoftDeleted);
            self.processes.save_with_history(process, row).await?;
            event!(Level::INFO, process_id = %id, actor = %actor.email, "process soft-deleted");
        }
        Ok(())
    }

    /// Audit trail of a process, newest first
    pub async fn history(&self, id: ProcessId, actor: &Persona) -> Result<Vec<ProcessHistory>, DomainError> {
        self.get(id, actor).await?;
        self.history.find_all_by_process(id).await
    }

    /// Validate that every referenced id exists, reporting kind and id on the
    /// first miss
    async fn resolve_references(
        &self,
        activity_ids: &[ActivityId],
        arch_ids: &[ArchId],
        gateway_ids: &[GatewayId]
    ) -> Result<(), DomainError> {
        for id in activity_ids {
            self.references
                .activity(*id)
                .await?
                .ok_or(DomainError::reference_not_found(EntityKind::Activity, *id))?;
        }
        for id in arch_ids {
            self.references
                .arch(*id)
                .await?
                .ok_or(DomainError::reference_not_found(EntityKind::Arch, *id))?;
        }
        for id in gateway_ids {
            self.references
                .gateway(*id)
                .await?
                .ok_or(DomainError::reference_not_found(EntityKind::Gateway, *id))?;
        }
        Ok(())
    }
}
