//! Persona registration and directory

use std::sync::Arc;

use tracing::{Level, event};

use crate::{
    domain::{DomainError, EntityKind, NewPersona, Persona, PersonaId, PersonaPatch},
    port::store::{OrganizationStore, PersonaStore}
};

/// Service for persona registration and lookup
pub struct PersonaService {
    personas:      Arc<dyn PersonaStore>,
    organizations: Arc<dyn OrganizationStore>
}

impl PersonaService {
    pub fn new(personas: Arc<dyn PersonaStore>, organizations: Arc<dyn OrganizationStore>) -> Self {
        Self { personas, organizations }
    }

    /// Register a persona. The organization, when given, must exist; email
    /// uniqueness is enforced by the store.
    pub async fn register(&self, input: NewPersona) -> Result<Persona, DomainError> {
        if let Some(org) = input.organization_id {
            self.organizations
                .find_by_id(org)
                .await?
                .ok_or(DomainError::not_found(EntityKind::Organization, org))?;
        }

        let persona = self
            .personas
            .save(Persona {
                id:           PersonaId::UNASSIGNED,
                name:         input.name,
                email:        input.email,
                role:         input.role,
                organization: input.organization_id
            })
            .await?;

        event!(Level::INFO, persona_id = %persona.id, email = %persona.email, "persona registered");
        Ok(persona)
    }

    pub async fn get(&self, id: PersonaId) -> Result<Persona, DomainError> {
        self.personas
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found(EntityKind::Persona, id))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Persona, DomainError> {
        self.personas.find_by_email(email).await?.ok_or(DomainError::ActorNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Persona>, DomainError> {
        self.personas.list().await
    }

    /// Partial update; a supplied organization is re-validated
    pub async fn update(&self, id: PersonaId, patch: PersonaPatch) -> Result<Persona, DomainError> {
        let mut persona = self.get(id).await?;

        if let Some(org) = patch.organization_id {
            self.organizations
                .find_by_id(org)
                .await?
                .ok_or(DomainError::not_found(EntityKind::Organization, org))?;
            persona.organization = Some(org);
        }
        if let Some(name) = patch.name {
            persona.name = name;
        }
        if let Some(email) = patch.email {
            persona.email = email;
        }
        if let Some(role) = patch.role {
            persona.role = role;
        }

        self.personas.save(persona).await
    }

    /// Remove a persona. Their email becomes available for registration again.
    pub async fn delete(&self, id: PersonaId) -> Result<(), DomainError> {
        let persona = self.get(id).await?;
        self.personas.delete(persona.id).await?;
        event!(Level::INFO, persona_id = %id, "persona deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapter::memory::InMemoryStore,
        domain::{OrgId, Organization, Role}
    };

    async fn service_with_org() -> (PersonaService, OrgId) {
        let store = Arc::new(InMemoryStore::new());
        let org = OrganizationStore::save(
            store.as_ref(),
            Organization { id: OrgId::UNASSIGNED, name: "Acme".to_string() }
        )
        .await
        .unwrap();
        (PersonaService::new(store.clone(), store), org.id)
    }

    fn new_persona(email: &str, org: Option<OrgId>) -> NewPersona {
        NewPersona {
            name:            "Ana".to_string(),
            email:           email.to_string(),
            role:            Role::Editor,
            organization_id: org
        }
    }

    #[tokio::test]
    async fn register_validates_organization() {
        let (service, org) = service_with_org().await;

        let persona = service.register(new_persona("ana@acme.com", Some(org))).await.unwrap();
        assert!(persona.id.is_assigned());
        assert_eq!(persona.organization, Some(org));

        assert_eq!(
            service.register(new_persona("bob@acme.com", Some(OrgId(42)))).await.unwrap_err(),
            DomainError::not_found(EntityKind::Organization, OrgId(42))
        );
    }

    #[tokio::test]
    async fn register_without_org_is_allowed() {
        let (service, _) = service_with_org().await;
        let persona = service.register(new_persona("nomad@none.com", None)).await.unwrap();
        assert_eq!(persona.organization, None);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (service, org) = service_with_org().await;
        service.register(new_persona("ana@acme.com", Some(org))).await.unwrap();

        let err = service.register(new_persona("ANA@ACME.COM", None)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_patches_only_supplied_fields() {
        let (service, org) = service_with_org().await;
        let persona = service.register(new_persona("ana@acme.com", Some(org))).await.unwrap();

        let patch = PersonaPatch { role: Some(Role::Admin), ..Default::default() };
        let updated = service.update(persona.id, patch).await.unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.organization, Some(org));

        let patch = PersonaPatch { organization_id: Some(OrgId(404)), ..Default::default() };
        assert_eq!(
            service.update(persona.id, patch).await.unwrap_err(),
            DomainError::not_found(EntityKind::Organization, OrgId(404))
        );
    }

    #[tokio::test]
    async fn delete_frees_the_email_for_registration() {
        let (service, org) = service_with_org().await;
        let persona = service.register(new_persona("ana@acme.com", Some(org))).await.unwrap();

        service.delete(persona.id).await.unwrap();
        assert_eq!(
            service.get(persona.id).await.unwrap_err(),
            DomainError::not_found(EntityKind::Persona, persona.id)
        );

        // Same address registers cleanly once the old record is gone
        service.register(new_persona("ana@acme.com", Some(org))).await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_unknown_persona_is_not_found() {
        let (service, _) = service_with_org().await;
        assert_eq!(
            service.delete(PersonaId(99)).await.unwrap_err(),
            DomainError::not_found(EntityKind::Persona, PersonaId(99))
        );
    }
}
