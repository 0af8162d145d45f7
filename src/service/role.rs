//! Process-role catalogue and activity assignment
//!
//! Roles are org-scoped; a role linked to at least one activity cannot be
//! deleted, and `where_used` answers "which processes does this role touch"
//! through the activity index instead of walking every process.

use std::sync::Arc;

use tracing::{Level, event};

use crate::{
    domain::{
        ActivityId, ActivityRoleLink, DomainError, EntityKind, LinkId, NewRole, Persona, ProcessRole, RoleId,
        RoleUsage, guard
    },
    port::store::{ActivityRoleLinkStore, ProcessRoleStore, ProcessStore, ReferenceStore}
};

/// Service for process-role management and activity links
pub struct RoleService {
    roles:      Arc<dyn ProcessRoleStore>,
    links:      Arc<dyn ActivityRoleLinkStore>,
    references: Arc<dyn ReferenceStore>,
    processes:  Arc<dyn ProcessStore>
}

impl RoleService {
    pub fn new(
        roles: Arc<dyn ProcessRoleStore>,
        links: Arc<dyn ActivityRoleLinkStore>,
        references: Arc<dyn ReferenceStore>,
        processes: Arc<dyn ProcessStore>
    ) -> Self {
        Self { roles, links, references, processes }
    }

    /// Create a role in the actor's organization
    pub async fn create(&self, input: NewRole, actor: &Persona) -> Result<ProcessRole, DomainError> {
        let org = guard::actor_org(actor)?;
        let role = self
            .roles
            .save(ProcessRole { id: RoleId::UNASSIGNED, name: input.name, organization: org })
            .await?;
        event!(Level::INFO, role_id = %role.id, org = %org, actor = %actor.email, "role created");
        Ok(role)
    }

    /// Roles of the actor's organization. Unlike process listing this errors
    /// for an actor without an organization.
    pub async fn list(&self, actor: &Persona) -> Result<Vec<ProcessRole>, DomainError> {
        let org = guard::actor_org(actor)?;
        self.roles.find_all_by_org(org).await
    }

    /// Load a role of the actor's organization
    pub async fn get(&self, id: RoleId, actor: &Persona) -> Result<ProcessRole, DomainError> {
        let role = self
            .roles
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found(EntityKind::ProcessRole, id))?;
        guard::check_same_org(Some(role.organization), actor)?;
        Ok(role)
    }

    /// Rename a role
    pub async fn update(&self, id: RoleId, name: Option<String>, actor: &Persona) -> Result<ProcessRole, DomainError> {
        let mut role = self.get(id, actor).await?;
        if let Some(name) = name {
            role.name = name;
        }
        self.roles.save(role).await
    }

    /// Delete a role. Refused while any activity link still references it.
    pub async fn delete(&self, id: RoleId, actor: &Persona) -> Result<(), DomainError> {
        let role = self.get(id, actor).await?;
        if self.links.exists_by_role(role.id).await? {
            return Err(DomainError::Conflict(format!(
                "role {} is still assigned to one or more activities",
                role.id
            )));
        }
        self.roles.delete(role.id).await?;
        event!(Level::INFO, role_id = %id, actor = %actor.email, "role deleted");
        Ok(())
    }

    /// Link a role to an activity.
    ///
    /// The role must belong to the actor's organization; activities carry no
    /// organization, so only their existence is checked. The (activity, role)
    /// pair is unique.
    pub async fn assign(&self, activity_id: ActivityId, role_id: RoleId, actor: &Persona) -> Result<ActivityRoleLink, DomainError> {
        let role = self.get(role_id, actor).await?;
        self.references
            .activity(activity_id)
            .await?
            .ok_or(DomainError::reference_not_found(EntityKind::Activity, activity_id))?;

        if self.links.exists_pair(activity_id, role.id).await? {
            return Err(DomainError::Conflict(format!(
                "role {} is already assigned to activity {}",
                role.id, activity_id
            )));
        }

        let link = self
            .links
            .save(ActivityRoleLink { id: LinkId::UNASSIGNED, activity_id, role_id: role.id })
            .await?;
        event!(Level::INFO, role_id = %role.id, activity_id = %activity_id, actor = %actor.email, "role assigned");
        Ok(link)
    }

    /// Remove an activity link
    pub async fn unassign(&self, activity_id: ActivityId, role_id: RoleId, actor: &Persona) -> Result<(), DomainError> {
        self.get(role_id, actor).await?;
        let link = self
            .links
            .find_all_by_role(role_id)
            .await?
            .into_iter()
            .find(|l| l.activity_id == activity_id)
            .ok_or(DomainError::reference_not_found(EntityKind::Activity, activity_id))?;
        self.links.delete(link.id).await
    }

    /// Where a role is used: its linked activities, and the processes of the
    /// actor's organization containing any of those activities
    pub async fn where_used(&self, role_id: RoleId, actor: &Persona) -> Result<RoleUsage, DomainError> {
        let role = self.get(role_id, actor).await?;

        let activity_ids: Vec<ActivityId> =
            self.links.find_all_by_role(role.id).await?.into_iter().map(|l| l.activity_id).collect();

        let mut process_ids: Vec<_> = self
            .processes
            .find_by_activity_ids(role.organization, &activity_ids)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        process_ids.sort_by_key(|id| id.0);
        process_ids.dedup();

        Ok(RoleUsage { activity_ids, process_ids })
    }
}
