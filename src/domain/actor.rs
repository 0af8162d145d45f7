//! Organizations and the personas acting inside them
//!
//! A persona is the trusted principal of every core operation: resolved once
//! at the boundary by [`crate::service::IdentityService`] and passed
//! explicitly into each engine call, never read from ambient state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::id::{OrgId, PersonaId};

/// Tenant boundary. Owns personas, processes and process roles.
///
/// The core never mutates an organization beyond seeding; it exists so the
/// guard can compare ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id:   OrgId,
    pub name: String
}

/// Coarse role of a persona inside its organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Editor,
    Viewer
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Editor => "EDITOR",
            Role::Viewer => "VIEWER"
        };
        write!(f, "{}", name)
    }
}

/// An authenticated actor
///
/// `email` is unique case-insensitively. `organization` is `None` only
/// transiently (e.g. a freshly registered account); every operation that
/// needs an organization fails with
/// [`DomainError::NoOrganization`](crate::domain::DomainError::NoOrganization)
/// while it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id:           PersonaId,
    pub name:         String,
    pub email:        String,
    pub role:         Role,
    pub organization: Option<OrgId>
}

/// Registration payload for a persona
///
/// Credential material (passwords, tokens) is handled by an external
/// collaborator and never crosses this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersona {
    pub name:            String,
    pub email:           String,
    pub role:            Role,
    pub organization_id: Option<OrgId>
}

/// Partial update for a persona; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaPatch {
    pub name:            Option<String>,
    pub email:           Option<String>,
    pub role:            Option<Role>,
    pub organization_id: Option<OrgId>
}
