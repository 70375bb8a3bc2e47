//! Loader for `ovh.conf` files and `.env` files.
//!
//! `ovh.conf` is an INI file. The `[default]` section names the endpoint and
//! the section named after that endpoint holds the keys:
//!
//! ```ini
//! [default]
//! endpoint=ovh-eu
//!
//! [ovh-eu]
//! application_key=my_app_key
//! application_secret=my_application_secret
//! consumer_key=my_consumer_key
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ConfigError;

/// Config file name looked up in the working and home directories.
pub const CONFIG_FILE_NAME: &str = "ovh.conf";

/// System-wide config file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/ovh.conf";

/// Parsed contents of one or more `ovh.conf` files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OvhConfigFile {
    /// Section name to key/value pairs.
    sections: HashMap<String, HashMap<String, String>>,
}

impl OvhConfigFile {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses INI content.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed section header or a line that is
    /// neither a comment, a section header nor a `key=value` pair.
    pub fn parse(content: &str, source: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        let mut section: Option<String> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| ConfigError::ConfigFile {
                    path: source.to_path_buf(),
                    message: format!("unterminated section header on line {}", index + 1),
                })?;
                section = Some(name.trim().to_string());
                continue;
            }

            let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) else {
                return Err(ConfigError::ConfigFile {
                    path: source.to_path_buf(),
                    message: format!("expected key=value on line {}", index + 1),
                });
            };

            let Some(current) = section.as_ref() else {
                return Err(ConfigError::ConfigFile {
                    path: source.to_path_buf(),
                    message: format!("key outside of any section on line {}", index + 1),
                });
            };

            config
                .sections
                .entry(current.clone())
                .or_default()
                .insert(key.trim().to_lowercase(), value.trim().to_string());
        }

        Ok(config)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Reading OVH config file: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: format!("failed to read file: {e}"),
        })?;

        Self::parse(&content, path)
    }

    /// Loads every existing file in `paths`; later files override earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_all(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = Self::new();

        for path in paths {
            if path.is_file() {
                info!("Loading OVH config from: {}", path.display());
                merged.merge(Self::load(path)?);
            }
        }

        Ok(merged)
    }

    /// Overlays `other` on top of this configuration.
    pub fn merge(&mut self, other: Self) {
        for (name, values) in other.sections {
            self.sections.entry(name).or_default().extend(values);
        }
    }

    /// Looks up a key in a section.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|values| values.get(key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns true if no section was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Returns the config file search path, lowest precedence first:
/// `/etc/ovh.conf`, `~/.ovh.conf`, `./ovh.conf`.
#[must_use]
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_FILE)];

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{CONFIG_FILE_NAME}")));
    }

    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Loads the `.env` file from `base_path` (or the working directory) if present.
///
/// # Errors
///
/// Returns an error if the .env file exists but cannot be loaded.
pub fn load_dotenv(base_path: Option<&Path>) -> Result<(), ConfigError> {
    let env_path = base_path.map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

    if env_path.exists() {
        info!("Loading environment from: {}", env_path.display());
        dotenvy::from_path(&env_path).map_err(|e| ConfigError::ConfigFile {
            path: env_path.clone(),
            message: format!("failed to load .env file: {e}"),
        })?;
    } else {
        debug!(".env file not found at: {}", env_path.display());
    }

    Ok(())
}
