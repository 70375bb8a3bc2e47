//! `ovh_vps_info` entrypoint.
//!
//! Runs as an Ansible binary module (`ovh_vps_info <args-file>`) or as a
//! standalone command with flags.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use ovh_vps_modules::cli::{init_logging, InfoCli, OutputFormatter};
use ovh_vps_modules::error::ModuleError;
use ovh_vps_modules::modules::vps_info::{self, MODULE_NAME};
use ovh_vps_modules::modules::{connect, exit_code, ModuleResult};

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = InfoCli::parse();

    init_logging(cli.common.verbose);
    let formatter = OutputFormatter::new(cli.common.output);

    let result = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime.block_on(run(cli)),
        Err(e) => Err(ModuleError::DependencyMissing {
            reason: format!("failed to create async runtime: {e}"),
        }),
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{}", formatter.format_result(MODULE_NAME, &result));
    }
    exit_code(&result)
}

/// Main async entry point.
async fn run(cli: InfoCli) -> ModuleResult {
    let mut args = cli
        .into_args()
        .map_err(|e| ModuleError::InvalidArguments(e.to_string()))?;
    debug!("Running {MODULE_NAME} for {}", args.service_name);

    let client = connect(std::mem::take(&mut args.credentials))?;
    vps_info::run(&client, &args).await
}
