use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::{GovernanceConfig, GovernanceSettings};
use crate::error::GovernanceError;
use crate::logic::configuration;
use crate::logic::connector::registry::StaticConnectorRegistry;
use crate::logic::connector::{self, ConnectorRegistryLike, IdentityConnectorConfig};
use crate::logic::property::{ConnectorConfig, Property};
use crate::logic::{OnGovernanceConfigChangeRx, OnGovernanceConfigChangeTx};
use crate::repository::IdentityProviderRepositoryLike;

/// Default broadcast channel capacity
const BROADCAST_CHANNEL_CAPACITY: usize = 100;

/// Parameters for constructing an IdentityGovernanceService
pub struct IdentityGovernanceServiceParams {
    pub repository: Arc<dyn IdentityProviderRepositoryLike>,
    pub connector_registry: Arc<dyn ConnectorRegistryLike>,
    pub settings: GovernanceSettings,
}

/// Facade over the resident identity provider store and the connector registry.
///
/// Holds no state of its own besides the change event channel. Concurrent
/// updates of the same tenant are not serialized here: each update is a
/// read-modify-write of the whole record, so callers must serialize them per
/// tenant if the store does not.
#[derive(Clone)]
pub struct IdentityGovernanceService {
    pub repository: Arc<dyn IdentityProviderRepositoryLike>,
    pub connector_registry: Arc<dyn ConnectorRegistryLike>,
    pub settings: GovernanceSettings,
    pub on_config_change_tx: OnGovernanceConfigChangeTx,
}

impl IdentityGovernanceService {
    pub fn new(params: IdentityGovernanceServiceParams) -> Self {
        let (on_config_change_tx, _) = tokio::sync::broadcast::channel(BROADCAST_CHANNEL_CAPACITY);

        Self {
            repository: params.repository,
            connector_registry: params.connector_registry,
            settings: params.settings,
            on_config_change_tx,
        }
    }

    /// Build a service whose connectors come from the config file
    pub fn from_config(
        repository: Arc<dyn IdentityProviderRepositoryLike>,
        config: GovernanceConfig,
    ) -> Result<Self, GovernanceError> {
        let connector_registry = StaticConnectorRegistry::from_connectors(config.connectors)?;
        Ok(Self::new(IdentityGovernanceServiceParams {
            repository,
            connector_registry: Arc::new(connector_registry),
            settings: config.settings,
        }))
    }

    pub fn subscribe(&self) -> OnGovernanceConfigChangeRx {
        self.on_config_change_tx.subscribe()
    }

    pub async fn update_configuration(
        &self,
        tenant_domain: &str,
        updates: IndexMap<String, String>,
    ) -> Result<(), GovernanceError> {
        configuration::update_configuration(
            self.repository.as_ref(),
            &self.settings,
            &self.on_config_change_tx,
            tenant_domain,
            updates,
        )
        .await
    }

    pub async fn get_configuration(
        &self,
        tenant_domain: &str,
    ) -> Result<Vec<Property>, GovernanceError> {
        configuration::get_configuration(self.repository.as_ref(), &self.settings, tenant_domain)
            .await
    }

    pub async fn get_configuration_by_names(
        &self,
        tenant_domain: &str,
        property_names: &[String],
    ) -> Result<Vec<Property>, GovernanceError> {
        configuration::get_configuration_by_names(
            self.repository.as_ref(),
            &self.settings,
            tenant_domain,
            property_names,
        )
        .await
    }

    pub async fn get_connector_list(
        &self,
    ) -> Result<Vec<Arc<dyn IdentityConnectorConfig>>, GovernanceError> {
        connector::get_connector_list(self.connector_registry.as_ref()).await
    }

    pub async fn get_connector_list_with_configs(
        &self,
        tenant_domain: &str,
    ) -> Result<Vec<ConnectorConfig>, GovernanceError> {
        connector::get_connector_list_with_configs(
            self.repository.as_ref(),
            self.connector_registry.as_ref(),
            &self.settings,
            tenant_domain,
        )
        .await
    }

    pub async fn get_categorized_connector_list_with_configs(
        &self,
        tenant_domain: &str,
    ) -> Result<IndexMap<String, Vec<ConnectorConfig>>, GovernanceError> {
        connector::get_categorized_connector_list_with_configs(
            self.repository.as_ref(),
            self.connector_registry.as_ref(),
            &self.settings,
            tenant_domain,
        )
        .await
    }

    pub async fn get_connector_list_with_configs_by_category(
        &self,
        tenant_domain: &str,
        category: &str,
    ) -> Result<Vec<ConnectorConfig>, GovernanceError> {
        connector::get_connector_list_with_configs_by_category(
            self.repository.as_ref(),
            self.connector_registry.as_ref(),
            &self.settings,
            tenant_domain,
            category,
        )
        .await
    }

    pub async fn get_connector_with_configs(
        &self,
        tenant_domain: &str,
        connector_name: &str,
    ) -> Result<Option<ConnectorConfig>, GovernanceError> {
        connector::get_connector_with_configs(
            self.repository.as_ref(),
            self.connector_registry.as_ref(),
            &self.settings,
            tenant_domain,
            connector_name,
        )
        .await
    }

    pub async fn get_default_configuration(
        &self,
        tenant_domain: &str,
    ) -> Result<Vec<Property>, GovernanceError> {
        connector::get_default_configuration(self.connector_registry.as_ref(), tenant_domain).await
    }
}

#[cfg(all(test, feature = "unit_test"))]
mod unit_test {
    use super::*;
    use crate::config::GovernanceConfig;
    use crate::logic::email_otp::{EMAIL_OTP_USE_ALPHANUMERIC_CHARS, EMAIL_OTP_USE_NUMERIC_CHARS};
    use crate::test::fixtures::{TEST_TENANT, TestContext};

    fn create_test_service() -> (TestContext, IdentityGovernanceService) {
        let ctx = TestContext::new();
        let service = IdentityGovernanceService::new(IdentityGovernanceServiceParams {
            repository: Arc::new(ctx.repository.clone()),
            connector_registry: ctx.connector_registry.clone(),
            settings: ctx.settings.clone(),
        });
        (ctx, service)
    }

    #[tokio::test]
    async fn test_update_then_read_through_service() {
        let (_ctx, service) = create_test_service();
        let mut rx = service.subscribe();

        service
            .update_configuration(
                TEST_TENANT,
                IndexMap::from([
                    (EMAIL_OTP_USE_ALPHANUMERIC_CHARS.to_string(), "false".to_string()),
                    (EMAIL_OTP_USE_NUMERIC_CHARS.to_string(), "false".to_string()),
                ]),
            )
            .await
            .unwrap();
        assert!(rx.try_recv().is_ok());

        let config = service
            .get_connector_with_configs(TEST_TENANT, "email-otp-authenticator")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            config.properties[3].as_ref().unwrap().value.as_deref(),
            Some("false")
        );
        assert_eq!(
            config.properties[4].as_ref().unwrap().value.as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_update_without_subscribers_succeeds() {
        let (_ctx, service) = create_test_service();

        service
            .update_configuration(
                TEST_TENANT,
                IndexMap::from([("Recaptcha.Enabled".to_string(), "true".to_string())]),
            )
            .await
            .unwrap();

        let properties = service
            .get_configuration_by_names(TEST_TENANT, &["Recaptcha.Enabled".to_string()])
            .await
            .unwrap();
        assert_eq!(properties[0].value.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_connector_views_through_service() {
        let (_ctx, service) = create_test_service();

        let connectors = service.get_connector_list().await.unwrap();
        let full = service
            .get_connector_list_with_configs(TEST_TENANT)
            .await
            .unwrap();
        let categorized = service
            .get_categorized_connector_list_with_configs(TEST_TENANT)
            .await
            .unwrap();

        assert_eq!(connectors.len(), full.len());
        assert_eq!(
            categorized.values().map(Vec::len).sum::<usize>(),
            full.len()
        );
        for (category, configs) in &categorized {
            let by_category = service
                .get_connector_list_with_configs_by_category(TEST_TENANT, category)
                .await
                .unwrap();
            assert_eq!(&by_category, configs);
        }
        assert!(
            service
                .get_connector_with_configs(TEST_TENANT, "unknown")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_from_config_registers_connectors() {
        let ctx = TestContext::new();
        let config = GovernanceConfig::from_yaml_str(
            r#"
connectors:
  - name: self.sign.up
    friendly_name: Self Registration
    category: Account Management
    property_names:
      - SelfRegistration.Enable
    default_values:
      SelfRegistration.Enable: "false"
"#,
        )
        .unwrap();

        let service =
            IdentityGovernanceService::from_config(Arc::new(ctx.repository.clone()), config)
                .unwrap();

        let connectors = service.get_connector_list().await.unwrap();
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].name(), "self.sign.up");

        let defaults = service.get_default_configuration(TEST_TENANT).await.unwrap();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].value.as_deref(), Some("false"));

        let configs = service
            .get_connector_list_with_configs(TEST_TENANT)
            .await
            .unwrap();
        assert_eq!(configs[0].properties, vec![None]);
    }

    #[tokio::test]
    async fn test_from_config_rejects_duplicate_connectors() {
        let ctx = TestContext::new();
        let config = GovernanceConfig::from_yaml_str(
            r#"
connectors:
  - name: dup
    friendly_name: One
    category: A
  - name: dup
    friendly_name: Two
    category: B
"#,
        )
        .unwrap();

        let result =
            IdentityGovernanceService::from_config(Arc::new(ctx.repository.clone()), config);

        assert!(matches!(result, Err(GovernanceError::InvalidRequest { .. })));
    }
}
