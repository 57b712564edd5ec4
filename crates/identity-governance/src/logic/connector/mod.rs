//! Connector descriptors and the connector view built from them.
//!
//! A connector groups a set of governance properties (password policy, OTP
//! settings and so on) and carries the display metadata for them. The
//! registry only hands out descriptors; joining them with a tenant's stored
//! values happens here.

pub mod registry;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shared::error::CommonError;
use tracing::{debug, trace};
use utoipa::ToSchema;

use crate::config::GovernanceSettings;
use crate::error::GovernanceError;
use crate::logic::configuration::get_configuration;
use crate::logic::email_otp;
use crate::logic::property::{ConnectorConfig, Property};
use crate::repository::IdentityProviderRepositoryLike;

/// Optional presentation metadata for a single connector property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PropertyMetadata {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Self-description of a governance connector.
pub trait IdentityConnectorConfig: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn friendly_name(&self) -> &str;

    fn category(&self) -> &str;

    fn sub_category(&self) -> &str;

    fn order(&self) -> i32;

    /// Property names in the order the connector presents them.
    fn property_names(&self) -> Vec<String>;

    fn property_name_mapping(&self) -> HashMap<String, String>;

    fn property_description_mapping(&self) -> HashMap<String, String>;

    fn metadata(&self) -> Option<HashMap<String, PropertyMetadata>> {
        None
    }

    /// Names of the properties whose values must not be shown in plaintext for the tenant.
    fn confidential_property_names(&self, _tenant_domain: &str) -> Vec<String> {
        Vec::new()
    }

    fn default_property_values(
        &self,
        _tenant_domain: &str,
    ) -> Result<HashMap<String, String>, CommonError> {
        Ok(HashMap::new())
    }
}

#[async_trait]
pub trait ConnectorRegistryLike: Send + Sync {
    /// Registered connectors in registration order.
    async fn list_connectors(&self) -> Result<Vec<Arc<dyn IdentityConnectorConfig>>, CommonError>;
}

pub async fn get_connector_list<C: ConnectorRegistryLike + ?Sized>(
    connector_registry: &C,
) -> Result<Vec<Arc<dyn IdentityConnectorConfig>>, GovernanceError> {
    connector_registry
        .list_connectors()
        .await
        .map_err(|e| GovernanceError::config_access("Error while listing governance connectors", e))
}

/// Join one connector descriptor with the tenant's resolved properties.
fn build_connector_config(
    connector: &dyn IdentityConnectorConfig,
    tenant_domain: &str,
    properties: &[Property],
) -> ConnectorConfig {
    let friendly_names = connector.property_name_mapping();
    let descriptions = connector.property_description_mapping();
    let metadata = connector.metadata();
    let confidential_names = connector.confidential_property_names(tenant_domain);

    let slots = connector
        .property_names()
        .iter()
        .map(|property_name| {
            let stored = properties
                .iter()
                .find(|property| &property.name == property_name)?;
            let mut property = stored.clone();
            property.display_name = friendly_names.get(property_name).cloned();
            property.description = descriptions.get(property_name).cloned();
            if let Some(meta) = metadata.as_ref().and_then(|m| m.get(property_name)) {
                property.property_type = meta.property_type.clone();
                property.regex = meta.regex.clone();
                property.group_id = meta.group_id.clone();
            }
            if confidential_names.contains(property_name) {
                property.confidential = true;
            }
            Some(property)
        })
        .collect();

    ConnectorConfig {
        name: connector.name().to_string(),
        friendly_name: connector.friendly_name().to_string(),
        category: connector.category().to_string(),
        sub_category: connector.sub_category().to_string(),
        order: connector.order(),
        properties: slots,
    }
}

/// Every registered connector, in registry order, joined with the tenant's stored values
pub async fn get_connector_list_with_configs<R, C>(
    repository: &R,
    connector_registry: &C,
    settings: &GovernanceSettings,
    tenant_domain: &str,
) -> Result<Vec<ConnectorConfig>, GovernanceError>
where
    R: IdentityProviderRepositoryLike + ?Sized,
    C: ConnectorRegistryLike + ?Sized,
{
    let connectors = get_connector_list(connector_registry).await?;
    let properties = get_configuration(repository, settings, tenant_domain).await?;
    trace!(
        tenant_domain,
        connectors = connectors.len(),
        properties = properties.len(),
        "Building connector configs"
    );

    Ok(connectors
        .iter()
        .map(|connector| build_connector_config(connector.as_ref(), tenant_domain, &properties))
        .collect())
}

/// Connector configs grouped by category. Categories keep first-seen order.
pub async fn get_categorized_connector_list_with_configs<R, C>(
    repository: &R,
    connector_registry: &C,
    settings: &GovernanceSettings,
    tenant_domain: &str,
) -> Result<IndexMap<String, Vec<ConnectorConfig>>, GovernanceError>
where
    R: IdentityProviderRepositoryLike + ?Sized,
    C: ConnectorRegistryLike + ?Sized,
{
    let configs =
        get_connector_list_with_configs(repository, connector_registry, settings, tenant_domain)
            .await?;

    let mut categorized: IndexMap<String, Vec<ConnectorConfig>> = IndexMap::new();
    for config in configs {
        categorized
            .entry(config.category.clone())
            .or_default()
            .push(config);
    }
    Ok(categorized)
}

pub async fn get_connector_list_with_configs_by_category<R, C>(
    repository: &R,
    connector_registry: &C,
    settings: &GovernanceSettings,
    tenant_domain: &str,
    category: &str,
) -> Result<Vec<ConnectorConfig>, GovernanceError>
where
    R: IdentityProviderRepositoryLike + ?Sized,
    C: ConnectorRegistryLike + ?Sized,
{
    let configs =
        get_connector_list_with_configs(repository, connector_registry, settings, tenant_domain)
            .await?;

    Ok(configs
        .into_iter()
        .filter(|config| config.category == category)
        .collect())
}

/// Look up a single connector config by name. An unknown name is `Ok(None)`.
pub async fn get_connector_with_configs<R, C>(
    repository: &R,
    connector_registry: &C,
    settings: &GovernanceSettings,
    tenant_domain: &str,
    connector_name: &str,
) -> Result<Option<ConnectorConfig>, GovernanceError>
where
    R: IdentityProviderRepositoryLike + ?Sized,
    C: ConnectorRegistryLike + ?Sized,
{
    let configs =
        get_connector_list_with_configs(repository, connector_registry, settings, tenant_domain)
            .await?;

    let Some(mut config) = configs
        .into_iter()
        .find(|config| config.name == connector_name)
    else {
        debug!(tenant_domain, connector_name, "Connector not registered");
        return Ok(None);
    };

    // Legacy flag sync, only needed while the email OTP connector still declares
    // EmailOTP.OtpRegex.UseNumericChars
    if email_otp::has_both_character_set_flags(&settings.email_otp_connector, &config) {
        email_otp::sync_alphanumeric_chars_on_read(&mut config);
    }

    Ok(Some(config))
}

/// Default values of every registered connector's properties for the tenant.
///
/// Connectors are visited in registry order and each connector's properties in
/// declaration order; when two connectors supply a default for the same name the
/// first one wins.
pub async fn get_default_configuration<C: ConnectorRegistryLike + ?Sized>(
    connector_registry: &C,
    tenant_domain: &str,
) -> Result<Vec<Property>, GovernanceError> {
    let connectors = get_connector_list(connector_registry).await?;

    let mut defaults: IndexMap<String, Property> = IndexMap::new();
    for connector in connectors {
        let values = connector.default_property_values(tenant_domain).map_err(|e| {
            GovernanceError::config_access(
                format!(
                    "Error while resolving default values of connector {}",
                    connector.name()
                ),
                e,
            )
        })?;
        for property_name in connector.property_names() {
            if defaults.contains_key(&property_name) {
                continue;
            }
            if let Some(value) = values.get(&property_name) {
                defaults.insert(
                    property_name.clone(),
                    Property::new(property_name, Some(value.clone())),
                );
            }
        }
    }

    Ok(defaults.into_values().collect())
}
