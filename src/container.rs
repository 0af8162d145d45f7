//! Dependency wiring
//!
//! Builds the configured store bundle and hands each service the port handles
//! it needs.

use std::sync::Arc;

use anyhow::Result;

use crate::{
    adapter::{StoreFactory, StoreHandle},
    config::Config,
    service::{IdentityService, PersonaService, ProcessService, RoleService}
};

/// Application container holding the wired services
pub struct Container {
    pub stores:    StoreHandle,
    pub identity:  Arc<IdentityService>,
    pub personas:  Arc<PersonaService>,
    pub processes: Arc<ProcessService>,
    pub roles:     Arc<RoleService>
}

impl Container {
    /// Create a container from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let db_path = match &config.db_path {
            Some(path) => path.clone(),
            None => crate::config::get_default_db_path()?
        };
        let stores = StoreFactory::create(config.backend, Some(&db_path))?;
        Ok(Self::from_stores(stores))
    }

    /// Wire services over an existing store bundle
    pub fn from_stores(stores: StoreHandle) -> Self {
        let identity = Arc::new(IdentityService::new(stores.personas.clone()));
        let personas = Arc::new(PersonaService::new(stores.personas.clone(), stores.organizations.clone()));
        let processes = Arc::new(ProcessService::new(
            stores.processes.clone(),
            stores.history.clone(),
            stores.references.clone()
        ));
        let roles = Arc::new(RoleService::new(
            stores.roles.clone(),
            stores.links.clone(),
            stores.references.clone(),
            stores.processes.clone()
        ));

        Self { stores, identity, personas, processes, roles }
    }
}
