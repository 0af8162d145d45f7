//! Command-line interface

pub mod args;
pub mod commands;

use anyhow::{Context, Result};

pub use args::{Cli, Commands, PersonaCommands, ProcessCommands, RoleCommands};

use crate::{config, container::Container, domain::Persona};

/// Resolve the acting persona from `--actor`, the `BPM_ACTOR` environment
/// variable or the OS username
async fn resolve_actor(container: &Container, actor: Option<String>) -> Result<Persona> {
    let email = actor.unwrap_or_else(|| whoami::username().unwrap_or_else(|_| "unknown".to_string()));
    container
        .identity
        .resolve(&email)
        .await
        .with_context(|| format!("Unknown actor: {}", email))
}

/// Dispatch a parsed invocation
pub async fn run(cli: Cli) -> Result<()> {
    if matches!(cli.command, Commands::Init) {
        return commands::handle_init_command().await;
    }

    let mut cfg = config::load_config()?;
    if let Some(backend) = cli.backend {
        cfg.backend = backend;
    }
    let container = Container::new(&cfg)?;

    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Seed { file } => commands::handle_seed_command(&container, &file).await,
        Commands::Process { command } => {
            let actor = resolve_actor(&container, cli.actor).await?;
            commands::handle_process_command(&container, &actor, command).await
        }
        Commands::Role { command } => {
            let actor = resolve_actor(&container, cli.actor).await?;
            commands::handle_role_command(&container, &actor, command).await
        }
        Commands::Persona { command } => commands::handle_persona_command(&container, command).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        adapter::{InMemoryStore, StoreHandle},
        domain::{OrgId, PersonaId, Role}
    };

    fn empty_container() -> Container {
        Container::from_stores(StoreHandle::from_store(Arc::new(InMemoryStore::new())))
    }

    #[tokio::test]
    async fn explicit_actor_wins_over_fallback() {
        let stores = StoreHandle::from_store(Arc::new(InMemoryStore::new()));
        stores
            .personas
            .save(Persona {
                id:           PersonaId::UNASSIGNED,
                name:         "Ana".to_string(),
                email:        "ana@acme.com".to_string(),
                role:         Role::Editor,
                organization: Some(OrgId(1))
            })
            .await
            .unwrap();

        let container = Container::from_stores(stores);
        let actor = resolve_actor(&container, Some("ana@acme.com".to_string())).await.unwrap();
        assert_eq!(actor.email, "ana@acme.com");
    }

    #[tokio::test]
    async fn unknown_actor_names_the_email() {
        let err = resolve_actor(&empty_container(), Some("ghost@acme.com".to_string())).await.unwrap_err();
        assert!(err.to_string().contains("ghost@acme.com"));
    }

    #[tokio::test]
    async fn missing_actor_falls_back_to_os_username() {
        // The store is empty, so whatever the fallback resolves to must be
        // reported as an unknown actor rather than panicking
        let err = resolve_actor(&empty_container(), None).await.unwrap_err();
        assert!(err.to_string().starts_with("Unknown actor:"));
    }
}
