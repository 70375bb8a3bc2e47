//! CLI module for the OVH VPS modules.
//!
//! This module provides the command-line surface shared by the
//! `ovh_vps_info` and `ovh_vps_reboot` binaries.

mod commands;
mod output;

pub use commands::{CommonFlags, CredentialFlags, InfoCli, OutputFormat, RebootCli};
pub use output::OutputFormatter;

use tracing_subscriber::EnvFilter;

/// Initializes the logging system.
///
/// Logs go to stderr; stdout carries the module result. `RUST_LOG`
/// overrides the level chosen by `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
