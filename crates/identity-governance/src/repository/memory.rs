use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use shared::error::CommonError;
use tracing::trace;

use super::{IdentityProviderRepositoryLike, ResidentIdentityProvider};

/// In-process resident identity provider store keyed by tenant domain.
///
/// Clones share the same underlying map. Nothing is persisted across restarts.
#[derive(Clone, Default)]
pub struct InMemoryIdentityProviderRepository {
    resident_idps: Arc<DashMap<String, ResidentIdentityProvider>>,
}

impl InMemoryIdentityProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite the resident identity provider of a tenant
    pub fn insert_resident_idp(&self, tenant_domain: &str, resident_idp: ResidentIdentityProvider) {
        self.resident_idps
            .insert(tenant_domain.to_string(), resident_idp);
    }

    pub fn remove_resident_idp(&self, tenant_domain: &str) -> Option<ResidentIdentityProvider> {
        self.resident_idps
            .remove(tenant_domain)
            .map(|(_, resident_idp)| resident_idp)
    }

    pub fn tenant_count(&self) -> usize {
        self.resident_idps.len()
    }
}

#[async_trait]
impl IdentityProviderRepositoryLike for InMemoryIdentityProviderRepository {
    async fn get_resident_idp(
        &self,
        tenant_domain: &str,
    ) -> Result<ResidentIdentityProvider, CommonError> {
        trace!(tenant_domain, "Reading resident identity provider");
        self.resident_idps
            .get(tenant_domain)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CommonError::NotFound {
                msg: "Resident identity provider not found".to_string(),
                lookup_id: tenant_domain.to_string(),
                source: None,
            })
    }

    async fn update_resident_idp(
        &self,
        tenant_domain: &str,
        resident_idp: &ResidentIdentityProvider,
    ) -> Result<(), CommonError> {
        trace!(tenant_domain, "Replacing resident identity provider");
        self.resident_idps
            .insert(tenant_domain.to_string(), resident_idp.clone());
        Ok(())
    }
}

#[cfg(all(test, feature = "unit_test"))]
mod unit_test {
    use super::*;
    use crate::repository::{FederatedAuthenticatorConfig, IdentityProviderProperty};

    fn create_test_idp() -> ResidentIdentityProvider {
        ResidentIdentityProvider {
            idp_properties: vec![IdentityProviderProperty::new(
                "Recovery.Notification.Password.Enable",
                "false",
            )],
            federated_authenticator_configs: vec![FederatedAuthenticatorConfig::new("samlsso")],
        }
    }

    #[tokio::test]
    async fn test_get_unknown_tenant_is_not_found() {
        shared::setup_test!();
        let repo = InMemoryIdentityProviderRepository::new();

        let err = repo.get_resident_idp("unknown.com").await.unwrap_err();

        match err {
            CommonError::NotFound { lookup_id, .. } => assert_eq!(lookup_id, "unknown.com"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_then_get_returns_replaced_record() {
        shared::setup_test!();
        let repo = InMemoryIdentityProviderRepository::new();
        repo.insert_resident_idp("acme.com", create_test_idp());

        let replacement = ResidentIdentityProvider {
            idp_properties: vec![IdentityProviderProperty::new("a", "1")],
            federated_authenticator_configs: vec![],
        };
        repo.update_resident_idp("acme.com", &replacement).await.unwrap();

        let stored = repo.get_resident_idp("acme.com").await.unwrap();
        assert_eq!(stored, replacement);
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        shared::setup_test!();
        let repo = InMemoryIdentityProviderRepository::new();
        repo.insert_resident_idp("acme.com", create_test_idp());
        repo.insert_resident_idp("globex.com", ResidentIdentityProvider::default());

        let acme = repo.get_resident_idp("acme.com").await.unwrap();
        let globex = repo.get_resident_idp("globex.com").await.unwrap();

        assert_eq!(acme.idp_properties.len(), 1);
        assert!(globex.idp_properties.is_empty());
        assert_eq!(repo.tenant_count(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        shared::setup_test!();
        let repo = InMemoryIdentityProviderRepository::new();
        let clone = repo.clone();

        clone.insert_resident_idp("acme.com", create_test_idp());

        assert!(repo.get_resident_idp("acme.com").await.is_ok());
        assert!(repo.remove_resident_idp("acme.com").is_some());
        assert!(clone.get_resident_idp("acme.com").await.is_err());
    }
}
