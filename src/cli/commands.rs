//! CLI command definitions.
//!
//! Both binaries accept either an Ansible arguments file or the equivalent
//! flags. Flags given alongside an arguments file override its values.

use clap::{Args, Parser};
use secrecy::SecretString;
use std::path::PathBuf;

use crate::config::CredentialArgs;
use crate::error::ConfigError;
use crate::modules::{load_args, validate_args, InfoArgs, RebootArgs};

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Ansible JSON result.
    #[default]
    Json,
}

/// Options shared by both modules.
#[derive(Args, Debug, Default)]
pub struct CommonFlags {
    /// Ansible arguments file (JSON).
    pub args_file: Option<PathBuf>,

    /// VPS service name.
    #[arg(short, long, env = "OVH_SERVICE_NAME")]
    pub service_name: Option<String>,

    /// Report what would change without changing anything.
    #[arg(long)]
    pub check: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "json")]
    pub output: OutputFormat,
}

/// OVH credential flags. Unset flags fall back to the environment and
/// `ovh.conf`.
#[derive(Args, Debug, Default)]
pub struct CredentialFlags {
    /// Endpoint alias (ovh-eu, ovh-ca, ...) or API base URL.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Application key.
    #[arg(long)]
    pub application_key: Option<String>,

    /// Application secret.
    #[arg(long)]
    pub application_secret: Option<String>,

    /// Consumer key.
    #[arg(long)]
    pub consumer_key: Option<String>,
}

impl CredentialFlags {
    /// Applies the flags on top of credentials read elsewhere.
    fn apply(self, credentials: &mut CredentialArgs) {
        if let Some(endpoint) = self.endpoint {
            credentials.endpoint = Some(endpoint);
        }
        if let Some(key) = self.application_key {
            credentials.application_key = Some(key);
        }
        if let Some(secret) = self.application_secret {
            credentials.application_secret = Some(SecretString::from(secret));
        }
        if let Some(key) = self.consumer_key {
            credentials.consumer_key = Some(SecretString::from(key));
        }
    }
}

/// Fetch an OVH VPS record and its service info.
#[derive(Parser, Debug)]
#[command(name = "ovh_vps_info")]
#[command(author, version, about, long_about = None)]
pub struct InfoCli {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonFlags,

    /// Credential options.
    #[command(flatten)]
    pub credentials: CredentialFlags,
}

impl InfoCli {
    /// Builds the module parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments file cannot be loaded or the
    /// resulting parameters are invalid.
    pub fn into_args(self) -> Result<InfoArgs, ConfigError> {
        let mut args = match &self.common.args_file {
            Some(path) => load_args::<InfoArgs>(path)?,
            None => InfoArgs::default(),
        };

        if let Some(service) = self.common.service_name {
            args.service_name = service;
        }
        args.check_mode |= self.common.check;
        self.credentials.apply(&mut args.credentials);

        validate_args(&args)?;
        Ok(args)
    }
}

/// Reboot an OVH VPS, optionally into rescue mode.
#[derive(Parser, Debug)]
#[command(name = "ovh_vps_reboot")]
#[command(author, version, about, long_about = None)]
pub struct RebootCli {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonFlags,

    /// Credential options.
    #[command(flatten)]
    pub credentials: CredentialFlags,

    /// Boot into the rescue image.
    #[arg(long)]
    pub rescue: bool,

    /// Seconds to wait for provider tasks (0 waits forever).
    #[arg(long)]
    pub wait_timeout: Option<u64>,

    /// Seconds between two task polls.
    #[arg(long)]
    pub poll_interval: Option<u64>,
}

impl RebootCli {
    /// Builds the module parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments file cannot be loaded or the
    /// resulting parameters are invalid.
    pub fn into_args(self) -> Result<RebootArgs, ConfigError> {
        let mut args = match &self.common.args_file {
            Some(path) => load_args::<RebootArgs>(path)?,
            None => RebootArgs::default(),
        };

        if let Some(service) = self.common.service_name {
            args.service_name = service;
        }
        args.check_mode |= self.common.check;
        args.rescue |= self.rescue;
        if self.wait_timeout.is_some() {
            args.wait_timeout = self.wait_timeout;
        }
        if self.poll_interval.is_some() {
            args.poll_interval = self.poll_interval;
        }
        self.credentials.apply(&mut args.credentials);

        validate_args(&args)?;
        Ok(args)
    }
}
