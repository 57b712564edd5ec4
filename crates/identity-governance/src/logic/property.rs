use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::repository::IdentityProviderProperty;

/// A governance property as handed to presentation layers.
///
/// Values read straight from the store carry only `name` and `value`; the
/// presentation fields are filled in when the property is joined with the
/// metadata of the connector that declares it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub confidential: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            ..Default::default()
        }
    }
}

impl From<IdentityProviderProperty> for Property {
    fn from(property: IdentityProviderProperty) -> Self {
        Property::new(property.name, property.value)
    }
}

/// Transient, read-only view of one connector joined with a tenant's stored values.
///
/// `properties` has exactly one slot per property name the connector declares,
/// in declaration order. A slot is `None` when the tenant has no stored value
/// for that name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectorConfig {
    pub name: String,
    pub friendly_name: String,
    pub category: String,
    pub sub_category: String,
    pub order: i32,
    pub properties: Vec<Option<Property>>,
}

impl ConnectorConfig {
    pub fn property(&self, index: usize) -> Option<&Property> {
        self.properties.get(index).and_then(Option::as_ref)
    }

    pub fn property_by_name(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .flatten()
            .find(|property| property.name == name)
    }
}
