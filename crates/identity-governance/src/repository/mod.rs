mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::CommonError;
use utoipa::ToSchema;

pub use memory::InMemoryIdentityProviderRepository;

/// A name/value pair stored on the resident identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentityProviderProperty {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl IdentityProviderProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatorProperty {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub confidential: bool,
}

/// Federated authenticator configuration attached to the resident identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FederatedAuthenticatorConfig {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub properties: Vec<AuthenticatorProperty>,
}

impl FederatedAuthenticatorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            enabled: true,
            properties: Vec::new(),
        }
    }
}

/// The tenant-local identity provider record holding governance properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResidentIdentityProvider {
    #[serde(default)]
    pub idp_properties: Vec<IdentityProviderProperty>,
    #[serde(default)]
    pub federated_authenticator_configs: Vec<FederatedAuthenticatorConfig>,
}

// Repository trait for the per-tenant resident identity provider
#[async_trait]
pub trait IdentityProviderRepositoryLike: Send + Sync {
    /// Returns `CommonError::NotFound` when the tenant has no resident identity provider.
    async fn get_resident_idp(
        &self,
        tenant_domain: &str,
    ) -> Result<ResidentIdentityProvider, CommonError>;

    /// Replaces the whole resident identity provider record of the tenant.
    async fn update_resident_idp(
        &self,
        tenant_domain: &str,
        resident_idp: &ResidentIdentityProvider,
    ) -> Result<(), CommonError>;
}
