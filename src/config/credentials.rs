//! Credential resolution.
//!
//! Each field is resolved independently, highest precedence first:
//!
//! 1. explicit module arguments,
//! 2. `OVH_*` environment variables,
//! 3. `ovh.conf` files (see [`super::parser`]).
//!
//! The endpoint is resolved first because it selects the `ovh.conf` section
//! the keys are read from.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::ConfigError;

use super::endpoint::Endpoint;
use super::parser::{default_config_paths, OvhConfigFile};

/// Environment variable holding the endpoint.
pub const ENV_ENDPOINT: &str = "OVH_ENDPOINT";
/// Environment variable holding the application key.
pub const ENV_APPLICATION_KEY: &str = "OVH_APPLICATION_KEY";
/// Environment variable holding the application secret.
pub const ENV_APPLICATION_SECRET: &str = "OVH_APPLICATION_SECRET";
/// Environment variable holding the consumer key.
pub const ENV_CONSUMER_KEY: &str = "OVH_CONSUMER_KEY";

/// Credential fields as passed to a module, all optional.
#[derive(Default, Deserialize)]
pub struct CredentialArgs {
    /// Endpoint alias or URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Application key.
    #[serde(default)]
    pub application_key: Option<String>,
    /// Application secret.
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub application_secret: Option<SecretString>,
    /// Consumer key.
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub consumer_key: Option<SecretString>,
}

impl fmt::Debug for CredentialArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialArgs")
            .field("endpoint", &self.endpoint)
            .field("application_key", &self.application_key.as_ref().map(|_| "[REDACTED]"))
            .field("application_secret", &self.application_secret.as_ref().map(|_| "[REDACTED]"))
            .field("consumer_key", &self.consumer_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()).map(SecretString::from))
}

/// Fully resolved credentials, ready to build a client.
#[derive(Debug)]
pub struct Credentials {
    /// API endpoint.
    pub endpoint: Endpoint,
    /// Application key (sent in clear as `X-Ovh-Application`).
    pub application_key: String,
    /// Application secret (only used to sign requests).
    pub application_secret: SecretString,
    /// Consumer key.
    pub consumer_key: SecretString,
}

/// Resolves [`CredentialArgs`] against the environment and config files.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    /// Snapshot of the relevant environment variables.
    env: HashMap<String, String>,
    /// Config files to read, lowest precedence first.
    config_paths: Vec<PathBuf>,
}

impl CredentialResolver {
    /// Creates a resolver over the process environment and the default
    /// config file locations.
    #[must_use]
    pub fn from_environment() -> Self {
        let env = std::env::vars()
            .filter(|(key, _)| key.starts_with("OVH_"))
            .collect();

        Self {
            env,
            config_paths: default_config_paths(),
        }
    }

    /// Creates a resolver that sees no environment and no config files.
    #[must_use]
    pub fn isolated() -> Self {
        Self {
            env: HashMap::new(),
            config_paths: Vec::new(),
        }
    }

    /// Replaces the environment snapshot.
    #[must_use]
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Replaces the config file search path.
    #[must_use]
    pub fn with_config_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config_paths = paths;
        self
    }

    /// Resolves every credential field.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is malformed, the endpoint is
    /// unknown, or any field is missing from all sources.
    pub fn resolve(&self, args: CredentialArgs) -> Result<Credentials, ConfigError> {
        let file = OvhConfigFile::load_all(&self.config_paths)?;
        if file.is_empty() {
            debug!("No ovh.conf entries found");
        }

        let endpoint_name = args
            .endpoint
            .filter(|v| !v.is_empty())
            .or_else(|| self.env_value(ENV_ENDPOINT))
            .or_else(|| file.get("default", "endpoint").map(str::to_string))
            .ok_or_else(|| ConfigError::missing_credential("endpoint"))?;
        let endpoint = Endpoint::parse(&endpoint_name)?;
        debug!("Using OVH endpoint: {endpoint}");

        let section = endpoint.name().to_string();
        let from_file = |key: &str| file.get(&section, key).map(str::to_string);

        let application_key = args
            .application_key
            .filter(|v| !v.is_empty())
            .or_else(|| self.env_value(ENV_APPLICATION_KEY))
            .or_else(|| from_file("application_key"))
            .ok_or_else(|| ConfigError::missing_credential("application_key"))?;

        let application_secret = args
            .application_secret
            .or_else(|| self.env_value(ENV_APPLICATION_SECRET).map(SecretString::from))
            .or_else(|| from_file("application_secret").map(SecretString::from))
            .ok_or_else(|| ConfigError::missing_credential("application_secret"))?;

        let consumer_key = args
            .consumer_key
            .or_else(|| self.env_value(ENV_CONSUMER_KEY).map(SecretString::from))
            .or_else(|| from_file("consumer_key").map(SecretString::from))
            .ok_or_else(|| ConfigError::missing_credential("consumer_key"))?;

        Ok(Credentials {
            endpoint,
            application_key,
            application_secret,
            consumer_key,
        })
    }

    fn env_value(&self, name: &str) -> Option<String> {
        self.env.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn write_conf(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("ovh.conf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_explicit_args_win() {
        let args = CredentialArgs {
            endpoint: Some("ovh-ca".to_string()),
            application_key: Some("arg-key".to_string()),
            application_secret: Some(SecretString::from("arg-secret".to_string())),
            consumer_key: Some(SecretString::from("arg-consumer".to_string())),
        };
        let resolver = CredentialResolver::isolated().with_env(env(&[
            (ENV_ENDPOINT, "ovh-eu"),
            (ENV_APPLICATION_KEY, "env-key"),
        ]));

        let creds = resolver.resolve(args).unwrap();
        assert_eq!(creds.endpoint.name(), "ovh-ca");
        assert_eq!(creds.application_key, "arg-key");
        assert_eq!(creds.application_secret.expose_secret(), "arg-secret");
        assert_eq!(creds.consumer_key.expose_secret(), "arg-consumer");
    }

    #[test]
    fn test_env_beats_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write_conf(
            &dir,
            "[default]\nendpoint=ovh-eu\n[ovh-eu]\napplication_key=file-key\napplication_secret=file-secret\nconsumer_key=file-consumer\n",
        );
        let resolver = CredentialResolver::isolated()
            .with_env(env(&[(ENV_APPLICATION_KEY, "env-key")]))
            .with_config_paths(vec![conf]);

        let creds = resolver.resolve(CredentialArgs::default()).unwrap();
        assert_eq!(creds.endpoint.name(), "ovh-eu");
        assert_eq!(creds.application_key, "env-key");
        assert_eq!(creds.application_secret.expose_secret(), "file-secret");
        assert_eq!(creds.consumer_key.expose_secret(), "file-consumer");
    }

    #[test]
    fn test_keys_come_from_endpoint_section() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write_conf(
            &dir,
            "[ovh-eu]\napplication_key=eu-key\n[ovh-ca]\napplication_key=ca-key\napplication_secret=s\nconsumer_key=c\n",
        );
        let resolver = CredentialResolver::isolated()
            .with_env(env(&[(ENV_ENDPOINT, "ovh-ca")]))
            .with_config_paths(vec![conf]);

        let creds = resolver.resolve(CredentialArgs::default()).unwrap();
        assert_eq!(creds.application_key, "ca-key");
    }

    #[test]
    fn test_missing_field_is_named() {
        let resolver = CredentialResolver::isolated().with_env(env(&[
            (ENV_ENDPOINT, "ovh-eu"),
            (ENV_APPLICATION_KEY, "key"),
            (ENV_APPLICATION_SECRET, "secret"),
        ]));

        let result = resolver.resolve(CredentialArgs::default());
        match result {
            Err(ConfigError::MissingCredential { name }) => assert_eq!(name, "consumer_key"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_endpoint() {
        let result = CredentialResolver::isolated().resolve(CredentialArgs::default());
        assert!(matches!(
            result,
            Err(ConfigError::MissingCredential { ref name }) if name == "endpoint"
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let args = CredentialArgs {
            endpoint: Some("ovh-eu".to_string()),
            application_key: Some("visible?".to_string()),
            application_secret: Some(SecretString::from("hunter2".to_string())),
            consumer_key: None,
        };
        let rendered = format!("{args:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("visible?"));
        assert!(rendered.contains("ovh-eu"));
    }
}
