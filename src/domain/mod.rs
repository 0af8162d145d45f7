//! Domain layer - entities, payloads and pure business rules
//!
//! Everything in this module is synchronous and side-effect free. Persistence
//! and identity resolution live behind the ports in [`crate::port`].

pub mod actor;
pub mod error;
pub mod guard;
pub mod history;
pub mod id;
pub mod process;
pub mod refs;
pub mod role;

pub use actor::{NewPersona, Organization, Persona, PersonaPatch, Role};
pub use error::{DomainError, EntityKind};
pub use history::{ChangeLabel, ProcessHistory};
pub use id::{ActivityId, ArchId, GatewayId, HistoryId, LinkId, OrgId, PersonaId, ProcessId, RoleId};
pub use process::{NewProcess, Process, ProcessPatch, ProcessStatus};
pub use refs::{Activity, Arch, Gateway};
pub use role::{ActivityRoleLink, NewRole, ProcessRole, RoleUsage};
