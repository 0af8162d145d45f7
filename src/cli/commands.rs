//! CLI command handlers
//!
//! Thin translation layer: parse ids, resolve the actor, call the service,
//! render tables. Cross-organization denials are rendered exactly like a
//! missing record so other tenants' ids are never confirmed to exist.

use anyhow::{Context, Result};
use tabled::{Table, Tabled, settings::Style};

use super::args::{PersonaCommands, ProcessCommands, RoleCommands};
use crate::{
    config,
    container::Container,
    domain::{
        ActivityId, ArchId, DomainError, EntityKind, GatewayId, NewPersona, NewProcess, NewRole, OrgId, Persona,
        PersonaId, Process, ProcessHistory, ProcessId, ProcessPatch, ProcessRole, RoleId
    },
    seed
};

/// Map a cross-org denial to plain not-found before it reaches the user
fn conceal(kind: EntityKind, id: u64) -> impl FnOnce(DomainError) -> DomainError {
    move |err| match err {
        DomainError::CrossOrgAccess => DomainError::not_found(kind, id),
        other => other
    }
}

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "Id")]
    id:       u64,
    #[tabled(rename = "Name")]
    name:     String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status:   String,
    #[tabled(rename = "Org")]
    org:      u64
}

impl From<&Process> for ProcessRow {
    fn from(process: &Process) -> Self {
        Self {
            id:       process.id.0,
            name:     process.name.clone(),
            category: process.category.clone(),
            status:   process.status.to_string(),
            org:      process.organization.0
        }
    }
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date:        String,
    #[tabled(rename = "Change")]
    label:       String,
    #[tabled(rename = "Actor")]
    actor:       String,
    #[tabled(rename = "Status")]
    status:      String,
    #[tabled(rename = "Description")]
    description: String
}

impl From<&ProcessHistory> for HistoryRow {
    fn from(row: &ProcessHistory) -> Self {
        Self {
            date:        row.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            label:       row.label.to_string(),
            actor:       row.actor.clone().unwrap_or_else(|| "-".to_string()),
            status:      row.status.to_string(),
            description: row.description.clone()
        }
    }
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "Id")]
    id:   u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Org")]
    org:  u64
}

impl From<&ProcessRole> for RoleRow {
    fn from(role: &ProcessRole) -> Self {
        Self { id: role.id.0, name: role.name.clone(), org: role.organization.0 }
    }
}

#[derive(Tabled)]
struct PersonaRow {
    #[tabled(rename = "Id")]
    id:    u64,
    #[tabled(rename = "Name")]
    name:  String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role:  String,
    #[tabled(rename = "Org")]
    org:   String
}

impl From<&Persona> for PersonaRow {
    fn from(persona: &Persona) -> Self {
        Self {
            id:    persona.id.0,
            name:  persona.name.clone(),
            email: persona.email.clone(),
            role:  persona.role.to_string(),
            org:   persona.organization.map(|o| o.0.to_string()).unwrap_or_else(|| "-".to_string())
        }
    }
}

fn render<R: Tabled>(rows: Vec<R>) {
    if rows.is_empty() {
        println!("(no results)");
        return;
    }
    println!("{}", Table::new(rows).with(Style::modern()));
}

/// Handle the init command
pub async fn handle_init_command() -> Result<()> {
    let cfg = config::load_config().context("Failed to initialize configuration")?;
    let config_path = config::get_config_file_path()?;
    println!("Configuration ready at {}", config_path.display());
    println!("Backend: {}", cfg.backend.as_str());
    Ok(())
}

/// Handle the seed command
pub async fn handle_seed_command(container: &Container, file: &std::path::Path) -> Result<()> {
    seed::apply_seed_file(&container.stores, file).await?;
    println!("Seed applied from {}", file.display());
    Ok(())
}

/// Handle process subcommands
pub async fn handle_process_command(container: &Container, actor: &Persona, command: ProcessCommands) -> Result<()> {
    let service = &container.processes;
    match command {
        ProcessCommands::Create { name, description, category, status, activity_ids, arch_ids, gateway_ids } => {
            let input = NewProcess {
                name,
                description,
                category,
                status,
                activity_ids: activity_ids.into_iter().map(ActivityId).collect(),
                arch_ids: arch_ids.into_iter().map(ArchId).collect(),
                gateway_ids: gateway_ids.into_iter().map(GatewayId).collect()
            };
            let process = service.create(input, actor).await?;
            render(vec![ProcessRow::from(&process)]);
        }
        ProcessCommands::List { status } => {
            let processes = service.list(status, actor).await?;
            render(processes.iter().map(ProcessRow::from).collect());
        }
        ProcessCommands::Get { id } => {
            let process = service.get(ProcessId(id), actor).await.map_err(conceal(EntityKind::Process, id))?;
            render(vec![ProcessRow::from(&process)]);
            if !process.activity_ids.is_empty() {
                let ids: Vec<String> = process.activity_ids.iter().map(|a| a.to_string()).collect();
                println!("Activities: {}", ids.join(", "));
            }
        }
        ProcessCommands::Update { id, name, description, category, status, activity_ids, arch_ids, gateway_ids } => {
            let patch = ProcessPatch {
                name,
                description,
                category,
                status,
                activity_ids: activity_ids.map(|ids| ids.into_iter().map(ActivityId).collect()),
                arch_ids: arch_ids.map(|ids| ids.into_iter().map(ArchId).collect()),
                gateway_ids: gateway_ids.map(|ids| ids.into_iter().map(GatewayId).collect())
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to update: supply at least one field");
            }
            let process = service
                .update(ProcessId(id), patch, actor)
                .await
                .map_err(conceal(EntityKind::Process, id))?;
            render(vec![ProcessRow::from(&process)]);
        }
        ProcessCommands::Delete { id, hard } => {
            service.delete(ProcessId(id), hard, actor).await.map_err(conceal(EntityKind::Process, id))?;
            if hard {
                println!("Process {} permanently deleted", id);
            } else {
                println!("Process {} deactivated", id);
            }
        }
        ProcessCommands::History { id } => {
            let rows = service.history(ProcessId(id), actor).await.map_err(conceal(EntityKind::Process, id))?;
            render(rows.iter().map(HistoryRow::from).collect());
        }
    }
    Ok(())
}

/// Handle role subcommands
pub async fn handle_role_command(container: &Container, actor: &Persona, command: RoleCommands) -> Result<()> {
    let service = &container.roles;
    match command {
        RoleCommands::Create { name } => {
            let role = service.create(NewRole { name }, actor).await?;
            render(vec![RoleRow::from(&role)]);
        }
        RoleCommands::List => {
            let roles = service.list(actor).await?;
            render(roles.iter().map(RoleRow::from).collect());
        }
        RoleCommands::Update { id, name } => {
            let role =
                service.update(RoleId(id), name, actor).await.map_err(conceal(EntityKind::ProcessRole, id))?;
            render(vec![RoleRow::from(&role)]);
        }
        RoleCommands::Delete { id } => {
            service.delete(RoleId(id), actor).await.map_err(conceal(EntityKind::ProcessRole, id))?;
            println!("Role {} deleted", id);
        }
        RoleCommands::Assign { activity, role } => {
            service
                .assign(ActivityId(activity), RoleId(role), actor)
                .await
                .map_err(conceal(EntityKind::ProcessRole, role))?;
            println!("Role {} assigned to activity {}", role, activity);
        }
        RoleCommands::Unassign { activity, role } => {
            service
                .unassign(ActivityId(activity), RoleId(role), actor)
                .await
                .map_err(conceal(EntityKind::ProcessRole, role))?;
            println!("Role {} removed from activity {}", role, activity);
        }
        RoleCommands::Usage { id } => {
            let usage =
                service.where_used(RoleId(id), actor).await.map_err(conceal(EntityKind::ProcessRole, id))?;
            let activities: Vec<String> = usage.activity_ids.iter().map(|a| a.to_string()).collect();
            let processes: Vec<String> = usage.process_ids.iter().map(|p| p.to_string()).collect();
            println!("Activities: {}", if activities.is_empty() { "-".to_string() } else { activities.join(", ") });
            println!("Processes:  {}", if processes.is_empty() { "-".to_string() } else { processes.join(", ") });
        }
    }
    Ok(())
}

/// Handle persona subcommands
pub async fn handle_persona_command(container: &Container, command: PersonaCommands) -> Result<()> {
    let service = &container.personas;
    match command {
        PersonaCommands::Register { name, email, role, organization } => {
            let persona = service
                .register(NewPersona { name, email, role, organization_id: organization.map(OrgId) })
                .await?;
            render(vec![PersonaRow::from(&persona)]);
        }
        PersonaCommands::List => {
            let personas = service.list().await?;
            render(personas.iter().map(PersonaRow::from).collect());
        }
        PersonaCommands::Show { email } => {
            let persona = service.get_by_email(&email).await?;
            render(vec![PersonaRow::from(&persona)]);
        }
        PersonaCommands::Delete { id } => {
            service.delete(PersonaId(id)).await?;
            println!("Persona {} deleted", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        adapter::{InMemoryStore, StoreHandle},
        domain::Role
    };

    #[test]
    fn conceal_rewrites_only_cross_org() {
        let err = conceal(EntityKind::Process, 7)(DomainError::CrossOrgAccess);
        assert_eq!(err, DomainError::not_found(EntityKind::Process, 7u64));

        let err = conceal(EntityKind::Process, 7)(DomainError::NoOrganization);
        assert_eq!(err, DomainError::NoOrganization);
    }

    #[tokio::test]
    async fn update_without_fields_is_rejected() {
        let container = Container::from_stores(StoreHandle::from_store(Arc::new(InMemoryStore::new())));
        let actor = Persona {
            id:           PersonaId(1),
            name:         "Ana".to_string(),
            email:        "ana@acme.com".to_string(),
            role:         Role::Editor,
            organization: Some(OrgId(1))
        };

        let command = ProcessCommands::Update {
            id:           1,
            name:         None,
            description:  None,
            category:     None,
            status:       None,
            activity_ids: None,
            arch_ids:     None,
            gateway_ids:  None
        };
        let err = handle_process_command(&container, &actor, command).await.unwrap_err();
        assert!(err.to_string().contains("nothing to update"));
    }
}
