//! Read and merge the flat governance properties of a tenant's resident identity provider.

use indexmap::IndexMap;
use tracing::{error, info, trace};

use crate::config::GovernanceSettings;
use crate::error::GovernanceError;
use crate::logic::email_otp;
use crate::logic::property::Property;
use crate::logic::{
    GovernanceConfigUpdatedInfo, OnGovernanceConfigChangeEvt, OnGovernanceConfigChangeTx,
};
use crate::repository::{
    FederatedAuthenticatorConfig, IdentityProviderProperty, IdentityProviderRepositoryLike,
};

/// Overlay `updates` on the stored properties.
///
/// Existing properties keep their position and take the update value when one
/// is given. Update keys that are not stored yet are appended in update order.
fn merge_properties(
    existing: Vec<IdentityProviderProperty>,
    mut updates: IndexMap<String, String>,
) -> Vec<IdentityProviderProperty> {
    let mut merged = Vec::with_capacity(existing.len() + updates.len());

    for property in existing {
        let value = match updates.shift_remove(&property.name) {
            Some(value) => Some(value),
            None => property.value,
        };
        merged.push(IdentityProviderProperty {
            name: property.name,
            value,
        });
    }

    merged.extend(
        updates
            .into_iter()
            .map(|(name, value)| IdentityProviderProperty {
                name,
                value: Some(value),
            }),
    );
    merged
}

fn retain_allowed_authenticators(
    configs: Vec<FederatedAuthenticatorConfig>,
    allowed_authenticators: &[String],
) -> Vec<FederatedAuthenticatorConfig> {
    configs
        .into_iter()
        .filter(|config| allowed_authenticators.contains(&config.name))
        .collect()
}

/// Merge `updates` into the tenant's governance properties and persist the record.
///
/// No stored key is ever dropped. Federated authenticator configs outside
/// `settings.allowed_authenticators` are removed from the saved record.
pub async fn update_configuration<R: IdentityProviderRepositoryLike + ?Sized>(
    repository: &R,
    settings: &GovernanceSettings,
    on_config_change_tx: &OnGovernanceConfigChangeTx,
    tenant_domain: &str,
    mut updates: IndexMap<String, String>,
) -> Result<(), GovernanceError> {
    let mut resident_idp = repository
        .get_resident_idp(tenant_domain)
        .await
        .map_err(|e| {
            error!(tenant_domain, error = %e, "Error while reading resident identity provider for update");
            GovernanceError::config_access(
                format!("Error while retrieving resident identity provider for {tenant_domain} tenant"),
                e,
            )
        })?;

    email_otp::sync_numeric_chars_on_write(&mut updates);
    let property_names: Vec<String> = updates.keys().cloned().collect();

    resident_idp.idp_properties =
        merge_properties(std::mem::take(&mut resident_idp.idp_properties), updates);
    resident_idp.federated_authenticator_configs = retain_allowed_authenticators(
        std::mem::take(&mut resident_idp.federated_authenticator_configs),
        &settings.allowed_authenticators,
    );

    repository
        .update_resident_idp(tenant_domain, &resident_idp)
        .await
        .map_err(|e| {
            error!(tenant_domain, error = %e, "Error while updating identity management properties of resident identity provider");
            GovernanceError::config_access(
                format!("Error while updating resident identity provider for {tenant_domain} tenant"),
                e,
            )
        })?;

    info!(
        tenant_domain,
        properties = property_names.len(),
        "Updated governance configuration"
    );

    let evt = OnGovernanceConfigChangeEvt::Updated(GovernanceConfigUpdatedInfo {
        tenant_domain: tenant_domain.to_string(),
        property_names,
    });
    if let Err(e) = on_config_change_tx.send(evt) {
        trace!("No subscribers for governance config change event: {e}");
    }

    Ok(())
}

/// All stored governance properties of the tenant, without the housekeeping sentinel
pub async fn get_configuration<R: IdentityProviderRepositoryLike + ?Sized>(
    repository: &R,
    settings: &GovernanceSettings,
    tenant_domain: &str,
) -> Result<Vec<Property>, GovernanceError> {
    let resident_idp = repository
        .get_resident_idp(tenant_domain)
        .await
        .map_err(|e| {
            GovernanceError::config_access(
                format!("Error while retrieving resident identity provider for {tenant_domain} tenant"),
                e,
            )
        })?;

    Ok(resident_idp
        .idp_properties
        .into_iter()
        .filter(|property| property.name != settings.already_written_property_key)
        .map(Property::from)
        .collect())
}

/// Stored properties for the requested names, in request order.
///
/// Names without a stored value are skipped. A name requested twice is returned twice.
pub async fn get_configuration_by_names<R: IdentityProviderRepositoryLike + ?Sized>(
    repository: &R,
    settings: &GovernanceSettings,
    tenant_domain: &str,
    property_names: &[String],
) -> Result<Vec<Property>, GovernanceError> {
    let all_properties = get_configuration(repository, settings, tenant_domain).await?;

    Ok(property_names
        .iter()
        .filter_map(|name| all_properties.iter().find(|p| &p.name == name).cloned())
        .collect())
}
