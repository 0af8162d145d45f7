//! YAML seed files
//!
//! Bootstraps a fresh database with organizations, personas and the shared
//! reference entities (activities, arches, gateways). Seeding is idempotent
//! per id: rows carrying an explicit id overwrite whatever is stored under
//! it, rows without one are appended with a fresh id. Explicit ids advance
//! the store's id allocator, so appended rows never collide with them.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{Level, event};

use crate::{
    adapter::StoreHandle,
    domain::{
        Activity, Arch, Gateway, Organization, Persona, Role,
        id::{ActivityId, ArchId, GatewayId, OrgId, PersonaId}
    }
};

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    organizations: Vec<SeedOrganization>,
    #[serde(default)]
    personas:      Vec<SeedPersona>,
    #[serde(default)]
    activities:    Vec<SeedNamed>,
    #[serde(default)]
    arches:        Vec<SeedNamed>,
    #[serde(default)]
    gateways:      Vec<SeedNamed>
}

#[derive(Debug, Deserialize)]
struct SeedOrganization {
    #[serde(default)]
    id:   u64,
    name: String
}

#[derive(Debug, Deserialize)]
struct SeedPersona {
    #[serde(default)]
    id:           u64,
    name:         String,
    email:        String,
    role:         Role,
    #[serde(default)]
    organization: Option<u64>
}

#[derive(Debug, Deserialize)]
struct SeedNamed {
    #[serde(default)]
    id:   u64,
    name: String
}

/// Load a seed file and apply it to the stores
pub async fn apply_seed_file(stores: &StoreHandle, path: &Path) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    let seed: SeedFile =
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse seed file: {}", path.display()))?;
    apply(stores, seed).await
}

async fn apply(stores: &StoreHandle, seed: SeedFile) -> Result<()> {
    for org in seed.organizations {
        stores
            .organizations
            .save(Organization { id: OrgId(org.id), name: org.name })
            .await?;
    }

    for persona in seed.personas {
        stores
            .personas
            .save(Persona {
                id:           PersonaId(persona.id),
                name:         persona.name,
                email:        persona.email,
                role:         persona.role,
                organization: persona.organization.map(OrgId)
            })
            .await?;
    }

    for activity in seed.activities {
        stores
            .references
            .save_activity(Activity { id: ActivityId(activity.id), name: activity.name })
            .await?;
    }
    for arch in seed.arches {
        stores.references.save_arch(Arch { id: ArchId(arch.id), name: arch.name }).await?;
    }
    for gateway in seed.gateways {
        stores
            .references
            .save_gateway(Gateway { id: GatewayId(gateway.id), name: gateway.name })
            .await?;
    }

    event!(Level::INFO, "seed applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapter::{InMemoryStore, StoreHandle};

    const SEED: &str = r#"
organizations:
  - id: 1
    name: Acme
personas:
  - name: Ana
    email: ana@acme.com
    role: ADMIN
    organization: 1
  - name: Nomad
    email: nomad@none.com
    role: VIEWER
activities:
  - id: 1
    name: intake
  - id: 2
    name: review
arches:
  - id: 21
    name: approve
gateways:
  - id: 31
    name: split
"#;

    #[tokio::test]
    async fn seed_populates_all_tables() {
        let stores = StoreHandle::from_store(Arc::new(InMemoryStore::new()));
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        apply(&stores, seed).await.unwrap();

        assert!(stores.organizations.find_by_id(OrgId(1)).await.unwrap().is_some());

        let ana = stores.personas.find_by_email("ana@acme.com").await.unwrap().unwrap();
        assert_eq!(ana.role, Role::Admin);
        assert_eq!(ana.organization, Some(OrgId(1)));

        let nomad = stores.personas.find_by_email("nomad@none.com").await.unwrap().unwrap();
        assert_eq!(nomad.organization, None);

        assert!(stores.references.activity(ActivityId(2)).await.unwrap().is_some());
        assert!(stores.references.arch(ArchId(21)).await.unwrap().is_some());
        assert!(stores.references.gateway(GatewayId(31)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn mixed_explicit_and_allocated_ids_never_collide() {
        let stores = StoreHandle::from_store(Arc::new(InMemoryStore::new()));
        let seed: SeedFile = serde_yaml::from_str(
            r#"
activities:
  - id: 1
    name: intake
  - name: review
"#
        )
        .unwrap();
        apply(&stores, seed).await.unwrap();

        let intake = stores.references.activity(ActivityId(1)).await.unwrap().unwrap();
        assert_eq!(intake.name, "intake");
        let review = stores.references.activity(ActivityId(2)).await.unwrap().unwrap();
        assert_eq!(review.name, "review");
    }
}
