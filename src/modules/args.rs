//! Module parameter sets.
//!
//! Ansible runs binary modules with a single argument: the path of a JSON
//! file holding the task parameters plus Ansible's own `_ansible_*` keys.
//! Values are passed through untyped, so booleans and integers are accepted
//! in their string spellings too (`"yes"`, `"60"`).

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use validator::Validate;

use crate::config::CredentialArgs;
use crate::error::ConfigError;
use crate::ovh::{PollPolicy, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};

/// Parameters of the `ovh_vps_info` module.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct InfoArgs {
    /// VPS service name.
    #[validate(length(min = 1, message = "service_name must not be empty"))]
    pub service_name: String,

    /// Optional credentials.
    #[serde(flatten)]
    pub credentials: CredentialArgs,

    /// Ansible check mode.
    #[serde(
        rename = "_ansible_check_mode",
        default,
        deserialize_with = "deserialize_flexible_bool"
    )]
    pub check_mode: bool,
}

/// Parameters of the `ovh_vps_reboot` module.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RebootArgs {
    /// VPS service name.
    #[validate(length(min = 1, message = "service_name must not be empty"))]
    pub service_name: String,

    /// Reboot into the rescue image instead of the local disk.
    #[serde(default, deserialize_with = "deserialize_flexible_bool")]
    pub rescue: bool,

    /// Seconds to wait for provider tasks; `0` waits forever.
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub wait_timeout: Option<u64>,

    /// Seconds between two task polls.
    #[validate(range(min = 1, max = 3600, message = "poll_interval must be between 1 and 3600"))]
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub poll_interval: Option<u64>,

    /// Optional credentials.
    #[serde(flatten)]
    pub credentials: CredentialArgs,

    /// Ansible check mode.
    #[serde(
        rename = "_ansible_check_mode",
        default,
        deserialize_with = "deserialize_flexible_bool"
    )]
    pub check_mode: bool,
}

impl RebootArgs {
    /// Returns the task poll policy requested by the parameters.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        let interval = self
            .poll_interval
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs);
        let timeout = match self.wait_timeout {
            None => Some(DEFAULT_WAIT_TIMEOUT),
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        PollPolicy::default()
            .with_interval(interval)
            .with_timeout(timeout)
    }
}

/// Reads, parses and validates a module arguments file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON for `T`,
/// or fails validation.
pub fn load_args<T: DeserializeOwned + Validate>(path: &Path) -> Result<T, ConfigError> {
    debug!("Loading module arguments from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ArgsFile {
        path: path.to_path_buf(),
        message: format!("failed to read file: {e}"),
    })?;

    parse_args(&content, path)
}

/// Parses and validates module arguments from JSON text.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON for `T` or fails validation.
pub fn parse_args<T: DeserializeOwned + Validate>(content: &str, source: &Path) -> Result<T, ConfigError> {
    let args: T = serde_json::from_str(content).map_err(|e| ConfigError::ArgsFile {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;

    validate_args(&args)?;
    Ok(args)
}

/// Validates a parameter set.
///
/// # Errors
///
/// Returns an error describing every failed constraint.
pub fn validate_args<T: Validate>(args: &T) -> Result<(), ConfigError> {
    args.validate()
        .map_err(|e| ConfigError::invalid_argument("arguments", e.to_string()))
}

/// Parses an Ansible-style boolean.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "on" | "true" | "t" | "1" => Some(true),
        "no" | "n" | "off" | "false" | "f" | "0" | "" => Some(false),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleBool {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleU64 {
    Int(u64),
    Text(String),
}

fn deserialize_flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlexibleBool>::deserialize(deserializer)? {
        None => Ok(false),
        Some(FlexibleBool::Bool(value)) => Ok(value),
        Some(FlexibleBool::Int(value)) => Ok(value != 0),
        Some(FlexibleBool::Text(value)) => parse_bool(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid boolean value: {value}"))),
    }
}

fn deserialize_flexible_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlexibleU64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlexibleU64::Int(value)) => Ok(Some(value)),
        Some(FlexibleU64::Text(value)) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid integer value: {value}"))),
    }
}
