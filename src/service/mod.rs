//! Service layer - the engines orchestrating domain rules over the ports
//!
//! Every operation takes the resolved actor as an explicit `&Persona`
//! argument. The boundary resolves the actor once per operation through
//! [`IdentityService`] and passes it down; nothing here reads ambient state,
//! which keeps the engines trivially testable.

pub mod identity;
pub mod persona;
pub mod process;
pub mod role;

pub use identity::IdentityService;
pub use persona::PersonaService;
pub use process::ProcessService;
pub use role::RoleService;
