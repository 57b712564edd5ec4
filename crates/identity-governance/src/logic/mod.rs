pub mod configuration;
pub mod connector;
pub mod email_otp;
pub mod property;

/// Information about an applied governance update (for broadcast events)
#[derive(Clone, Debug)]
pub struct GovernanceConfigUpdatedInfo {
    pub tenant_domain: String,
    /// Keys carried by the update, after the email OTP flag sync
    pub property_names: Vec<String>,
}

/// Events fired when governance configuration changes
#[derive(Clone, Debug)]
pub enum OnGovernanceConfigChangeEvt {
    Updated(GovernanceConfigUpdatedInfo),
}

/// Sender for governance config change events
pub type OnGovernanceConfigChangeTx = tokio::sync::broadcast::Sender<OnGovernanceConfigChangeEvt>;
/// Receiver for governance config change events
pub type OnGovernanceConfigChangeRx =
    tokio::sync::broadcast::Receiver<OnGovernanceConfigChangeEvt>;
