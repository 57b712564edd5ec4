//! Keeps the two overlapping character-set flags of the email OTP connector in sync.
//!
//! `EmailOTP.UseAlphanumericChars` replaced `EmailOTP.OtpRegex.UseNumericChars`,
//! and the two are negations of each other. Tenants may still have only the
//! legacy flag persisted, so writes mirror the new flag into the legacy one and
//! reads of the connector derive the new flag from the legacy one.

use indexmap::IndexMap;
use tracing::debug;

use crate::logic::property::ConnectorConfig;

pub const EMAIL_OTP_AUTHENTICATOR: &str = "email-otp-authenticator";
pub const EMAIL_OTP_USE_ALPHANUMERIC_CHARS: &str = "EmailOTP.UseAlphanumericChars";
pub const EMAIL_OTP_USE_NUMERIC_CHARS: &str = "EmailOTP.OtpRegex.UseNumericChars";

const USE_ALPHANUMERIC_CHARS_POSITION: usize = 3;
const USE_NUMERIC_CHARS_POSITION: usize = 4;
/// The connector declares at least this many properties once both flags exist.
const MIN_PROPERTY_COUNT_WITH_BOTH_FLAGS: usize = 5;

/// `"true"` in any letter case is true, everything else (including no value) is false.
pub fn parse_boolean(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// When an update carries both flags the legacy flag is overwritten with the
/// negation of the new one.
pub fn sync_numeric_chars_on_write(updates: &mut IndexMap<String, String>) {
    let Some(use_alphanumeric_chars) = updates.get(EMAIL_OTP_USE_ALPHANUMERIC_CHARS) else {
        return;
    };
    let use_numeric_chars = !parse_boolean(Some(use_alphanumeric_chars));

    if let Some(legacy) = updates.get_mut(EMAIL_OTP_USE_NUMERIC_CHARS) {
        *legacy = use_numeric_chars.to_string();
    }
}

pub fn has_both_character_set_flags(email_otp_connector: &str, config: &ConnectorConfig) -> bool {
    config.name == email_otp_connector
        && config.properties.len() >= MIN_PROPERTY_COUNT_WITH_BOTH_FLAGS
}

/// Overwrite the displayed value of the new flag with the negation of the
/// persisted legacy flag.
///
/// Both flags are expected at fixed positions of the connector's declared
/// properties. If either slot is empty or holds a different property the
/// config is left untouched.
pub fn sync_alphanumeric_chars_on_read(config: &mut ConnectorConfig) {
    let positions_hold_flags = config
        .property(USE_ALPHANUMERIC_CHARS_POSITION)
        .is_some_and(|p| p.name == EMAIL_OTP_USE_ALPHANUMERIC_CHARS)
        && config
            .property(USE_NUMERIC_CHARS_POSITION)
            .is_some_and(|p| p.name == EMAIL_OTP_USE_NUMERIC_CHARS);

    if !positions_hold_flags {
        debug!(
            connector = config.name.as_str(),
            "The order of the connector properties has changed, skipping character set flag sync"
        );
        return;
    }

    let Some(use_numeric_chars) = config
        .property(USE_NUMERIC_CHARS_POSITION)
        .and_then(|p| p.value.as_deref())
        .map(|v| parse_boolean(Some(v)))
    else {
        return;
    };

    if let Some(Some(property)) = config.properties.get_mut(USE_ALPHANUMERIC_CHARS_POSITION) {
        property.value = Some((!use_numeric_chars).to_string());
    }
}
