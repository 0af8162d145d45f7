//! Organization guard - the central cross-tenant safety check
//!
//! Applied before any read, update or delete of an organization-scoped
//! entity. The equality check between two organization ids is the sole
//! mechanism preventing cross-tenant interference, so it is evaluated fresh
//! on every operation and never cached: role or organization membership can
//! change between requests.

use crate::domain::{actor::Persona, error::DomainError, id::OrgId};

/// Organization of the actor, or [`DomainError::NoOrganization`].
///
/// An actor without an organization can create nothing and access nothing
/// organization-scoped; this is a state problem, distinct from a cross-org
/// mismatch.
pub fn actor_org(actor: &Persona) -> Result<OrgId, DomainError> {
    actor.organization.ok_or(DomainError::NoOrganization)
}

/// Require that the target's organization equals the actor's.
///
/// Fails with [`DomainError::CrossOrgAccess`] when the target organization is
/// absent or differs, and with [`DomainError::NoOrganization`] when the actor
/// itself has none.
pub fn check_same_org(target: Option<OrgId>, actor: &Persona) -> Result<(), DomainError> {
    let own = actor_org(actor)?;
    match target {
        Some(org) if org == own => Ok(()),
        _ => Err(DomainError::CrossOrgAccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        actor::{Persona, Role},
        id::PersonaId
    };

    fn persona(org: Option<u64>) -> Persona {
        Persona {
            id:           PersonaId(1),
            name:         "Ana".to_string(),
            email:        "ana@example.com".to_string(),
            role:         Role::Editor,
            organization: org.map(OrgId)
        }
    }

    #[test]
    fn same_org_passes() {
        assert_eq!(check_same_org(Some(OrgId(1)), &persona(Some(1))), Ok(()));
    }

    #[test]
    fn different_org_is_cross_org() {
        assert_eq!(check_same_org(Some(OrgId(2)), &persona(Some(1))), Err(DomainError::CrossOrgAccess));
    }

    #[test]
    fn absent_target_org_is_cross_org() {
        assert_eq!(check_same_org(None, &persona(Some(1))), Err(DomainError::CrossOrgAccess));
    }

    #[test]
    fn actor_without_org_is_distinct_from_mismatch() {
        assert_eq!(check_same_org(Some(OrgId(1)), &persona(None)), Err(DomainError::NoOrganization));
        assert_eq!(actor_org(&persona(None)), Err(DomainError::NoOrganization));
    }
}
