//! Ports - interfaces the core consumes from its collaborators

pub mod store;

pub use store::{
    ActivityRoleLinkStore, HistoryStore, OrganizationStore, PersonaStore, ProcessRoleStore, ProcessStore,
    ReferenceStore
};
