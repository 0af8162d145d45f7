//! Identity resolution - email to trusted principal

use std::sync::Arc;

use crate::{
    domain::{DomainError, Persona},
    port::store::PersonaStore
};

/// Maps an authenticated principal identifier to its persona record.
///
/// The result is the trusted principal for the remainder of the operation;
/// callers resolve once at the boundary and never re-resolve mid-operation.
/// Results are never cached across operations, since role and organization
/// membership can change between requests.
pub struct IdentityService {
    personas: Arc<dyn PersonaStore>
}

impl IdentityService {
    pub fn new(personas: Arc<dyn PersonaStore>) -> Self {
        Self { personas }
    }

    /// Resolve an actor email (case-insensitive) or fail with
    /// [`DomainError::ActorNotFound`].
    pub async fn resolve(&self, email: &str) -> Result<Persona, DomainError> {
        self.personas.find_by_email(email).await?.ok_or(DomainError::ActorNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapter::memory::InMemoryStore,
        domain::{OrgId, PersonaId, Role}
    };

    #[tokio::test]
    async fn resolves_case_insensitively() {
        let store = Arc::new(InMemoryStore::new());
        PersonaStore::save(
            store.as_ref(),
            Persona {
                id:           PersonaId::UNASSIGNED,
                name:         "Ana".to_string(),
                email:        "Ana@Example.com".to_string(),
                role:         Role::Editor,
                organization: Some(OrgId(1))
            }
        )
        .await
        .unwrap();

        let identity = IdentityService::new(store);
        let actor = identity.resolve("ana@EXAMPLE.com").await.unwrap();
        assert_eq!(actor.email, "Ana@Example.com");
    }

    #[tokio::test]
    async fn unknown_email_is_actor_not_found() {
        let identity = IdentityService::new(Arc::new(InMemoryStore::new()));
        assert_eq!(identity.resolve("ghost@example.com").await.unwrap_err(), DomainError::ActorNotFound);
    }
}
