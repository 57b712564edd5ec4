use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::CommonError;
use tracing::{debug, info};
use utoipa::ToSchema;

use super::{ConnectorRegistryLike, IdentityConnectorConfig, PropertyMetadata};

fn default_sub_category() -> String {
    "DEFAULT".to_string()
}

/// Connector whose whole description is data, typically loaded from the governance config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub struct StaticConnector {
    pub name: String,
    pub friendly_name: String,
    pub category: String,
    #[serde(default = "default_sub_category")]
    pub sub_category: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub property_names: Vec<String>,
    #[serde(default)]
    pub property_friendly_names: HashMap<String, String>,
    #[serde(default)]
    pub property_descriptions: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, PropertyMetadata>,
    /// Same for every tenant
    #[serde(default)]
    pub confidential_properties: Vec<String>,
    #[serde(default)]
    pub default_values: HashMap<String, String>,
}

impl IdentityConnectorConfig for StaticConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn sub_category(&self) -> &str {
        &self.sub_category
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn property_names(&self) -> Vec<String> {
        self.property_names.clone()
    }

    fn property_name_mapping(&self) -> HashMap<String, String> {
        self.property_friendly_names.clone()
    }

    fn property_description_mapping(&self) -> HashMap<String, String> {
        self.property_descriptions.clone()
    }

    fn metadata(&self) -> Option<HashMap<String, PropertyMetadata>> {
        if self.metadata.is_empty() {
            None
        } else {
            Some(self.metadata.clone())
        }
    }

    fn confidential_property_names(&self, _tenant_domain: &str) -> Vec<String> {
        self.confidential_properties.clone()
    }

    fn default_property_values(
        &self,
        _tenant_domain: &str,
    ) -> Result<HashMap<String, String>, CommonError> {
        Ok(self.default_values.clone())
    }
}

/// Process-local connector registry.
///
/// Connectors are kept in registration order and names are unique. Readers get
/// a snapshot of the list, so registration never blocks `list_connectors`.
pub struct StaticConnectorRegistry {
    connectors: ArcSwap<Vec<Arc<dyn IdentityConnectorConfig>>>,
}

impl Default for StaticConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticConnectorRegistry {
    pub fn new() -> Self {
        Self {
            connectors: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Build a registry from configured connectors, in the given order
    pub fn from_connectors(
        connectors: impl IntoIterator<Item = StaticConnector>,
    ) -> Result<Self, CommonError> {
        let registry = Self::new();
        for connector in connectors {
            registry.register(Arc::new(connector))?;
        }
        Ok(registry)
    }

    /// Append a connector. Fails with `InvalidRequest` if the name is already registered.
    pub fn register(&self, connector: Arc<dyn IdentityConnectorConfig>) -> Result<(), CommonError> {
        let mut duplicate = false;
        self.connectors.rcu(|current| {
            duplicate = current.iter().any(|c| c.name() == connector.name());
            let mut next = Vec::clone(current);
            if !duplicate {
                next.push(connector.clone());
            }
            next
        });

        if duplicate {
            return Err(CommonError::InvalidRequest {
                msg: format!("Connector '{}' is already registered", connector.name()),
                source: None,
            });
        }

        info!(connector = connector.name(), "Registered governance connector");
        Ok(())
    }

    /// Remove a connector by name. Returns whether one was removed.
    pub fn unregister(&self, connector_name: &str) -> bool {
        let mut removed = false;
        self.connectors.rcu(|current| {
            let next: Vec<_> = current
                .iter()
                .filter(|c| c.name() != connector_name)
                .cloned()
                .collect();
            removed = next.len() != current.len();
            next
        });

        if removed {
            debug!(connector = connector_name, "Unregistered governance connector");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.connectors.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.load().is_empty()
    }
}

#[async_trait]
impl ConnectorRegistryLike for StaticConnectorRegistry {
    async fn list_connectors(&self) -> Result<Vec<Arc<dyn IdentityConnectorConfig>>, CommonError> {
        Ok(Vec::clone(&self.connectors.load()))
    }
}
