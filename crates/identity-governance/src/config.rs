use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GovernanceError;
use crate::logic::connector::registry::StaticConnector;
use crate::logic::email_otp::EMAIL_OTP_AUTHENTICATOR;

/// SAML2 web SSO inbound authenticator of the resident identity provider
pub const SAML2_SSO_AUTHENTICATOR: &str = "samlsso";
/// WS-Federation passive STS inbound authenticator of the resident identity provider
pub const PASSIVE_STS_AUTHENTICATOR: &str = "passivests";
/// Housekeeping key marking that governance properties were already written for a tenant
pub const ALREADY_WRITTEN_PROPERTY_KEY: &str = "__ALREADY_WRITTEN_PROPERTY_KEY__";
/// Environment variable pointing at the governance YAML config file
pub const GOVERNANCE_CONFIG_PATH_ENV: &str = "GOVERNANCE_CONFIG_PATH";

fn default_allowed_authenticators() -> Vec<String> {
    vec![
        SAML2_SSO_AUTHENTICATOR.to_string(),
        PASSIVE_STS_AUTHENTICATOR.to_string(),
    ]
}

fn default_already_written_property_key() -> String {
    ALREADY_WRITTEN_PROPERTY_KEY.to_string()
}

fn default_email_otp_connector() -> String {
    EMAIL_OTP_AUTHENTICATOR.to_string()
}

/// Knobs of the governance facade itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GovernanceSettings {
    /// Federated authenticator configs kept on the resident identity provider after an update
    #[serde(default = "default_allowed_authenticators")]
    pub allowed_authenticators: Vec<String>,
    #[serde(default = "default_already_written_property_key")]
    pub already_written_property_key: String,
    #[serde(default = "default_email_otp_connector")]
    pub email_otp_connector: String,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self {
            allowed_authenticators: default_allowed_authenticators(),
            already_written_property_key: default_already_written_property_key(),
            email_otp_connector: default_email_otp_connector(),
        }
    }
}

/// Top-level governance configuration file.
///
/// ```yaml
/// allowed_authenticators: [samlsso, passivests]
/// connectors:
///   - name: account.lock.handler
///     friendly_name: Account Lock
///     category: Login Attempts Security
///     property_names: [account.lock.handler.enable]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GovernanceConfig {
    #[serde(flatten)]
    pub settings: GovernanceSettings,
    #[serde(default)]
    pub connectors: Vec<StaticConnector>,
}

impl GovernanceConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GovernanceError> {
        let config: GovernanceConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        info!(
            path = %path.display(),
            connectors = config.connectors.len(),
            "Loaded governance config"
        );
        Ok(config)
    }

    /// Load from the file named by `GOVERNANCE_CONFIG_PATH`, or fall back to defaults when unset.
    ///
    /// `.env` and `.env.secrets` are loaded first, so the variable may come from either.
    pub fn load_from_env() -> Result<Self, GovernanceError> {
        shared::env::configure_env()?;

        match std::env::var(GOVERNANCE_CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => {
                debug!("{GOVERNANCE_CONFIG_PATH_ENV} not set, using default governance config");
                Ok(Self::default())
            }
        }
    }
}
