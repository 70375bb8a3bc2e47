//! `ovh_vps_reboot` entrypoint.
//!
//! Runs as an Ansible binary module (`ovh_vps_reboot <args-file>`) or as a
//! standalone command with flags. Ctrl-C skips any boot-mode update or
//! reboot not yet sent, stops the task wait and reports a failure.

use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing::{debug, warn};

use ovh_vps_modules::cli::{init_logging, OutputFormatter, RebootCli};
use ovh_vps_modules::error::ModuleError;
use ovh_vps_modules::modules::vps_reboot::MODULE_NAME;
use ovh_vps_modules::modules::{connect, exit_code, ModuleResult, RebootModule};
use ovh_vps_modules::ovh::TokioClock;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = RebootCli::parse();

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
async fn run(cli: RebootCli) -> ModuleResult {
    let mut args = cli
        .into_args()
        .map_err(|e| ModuleError::InvalidArguments(e.to_string()))?;
    debug!(
        "Running {MODULE_NAME} for {} (rescue: {}, check: {})",
        args.service_name, args.rescue, args.check_mode
    );

    let client = connect(std::mem::take(&mut args.credentials))?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping before further changes");
            let _ = cancel_tx.send(true);
        }
    });

    RebootModule::new(&client, TokioClock)
        .configured_for(&args)
        .with_cancel(cancel_rx)
        .run(&args)
        .await
}
