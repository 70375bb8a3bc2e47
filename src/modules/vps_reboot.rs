//! The `ovh_vps_reboot` module: reboot a VPS into local or rescue mode.
//!
//! The module reads the current netboot mode, switches it when it differs
//! from the requested one, always issues a reboot, and then waits for the
//! provider's task queue to drain. In check mode only the first read is
//! performed.

use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info};

use super::args::RebootArgs;
use super::result::{ModuleOutcome, ModuleResult};
use crate::error::{ModuleError, TaskError};
use crate::ovh::{reboot_path, vps_path, Clock, NetbootMode, OvhApi, TaskWatcher, VpsRecord};

/// Module name as registered with Ansible.
pub const MODULE_NAME: &str = "ovh_vps_reboot";

/// Upper bound on state transitions; a run takes at most six.
const MAX_STEPS: usize = 8;

/// What the run found and is about to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootPlan {
    /// Mode reported by the provider.
    pub current: NetbootMode,
    /// Mode requested by the caller.
    pub target: NetbootMode,
    /// Status text reported on success and prefixed to later failures.
    pub status: String,
}

impl BootPlan {
    /// Builds the plan for a VPS currently in `current`.
    #[must_use]
    pub fn new(current: NetbootMode, rescue: bool) -> Self {
        Self {
            current,
            target: NetbootMode::from_rescue(rescue),
            status: format!("Current mode: {current}\nRescue requested: {rescue}\n"),
        }
    }

    /// Whether the netboot mode has to be updated before rebooting.
    #[must_use]
    pub fn needs_change(&self) -> bool {
        self.current != self.target
    }

    /// Check-mode outcome.
    #[must_use]
    pub fn preview(&self) -> ModuleOutcome {
        let msg = if self.needs_change() {
            format!("Dry Run! Would change boot mode to {}.", self.target)
        } else {
            "Dry Run! Would not change boot mode.".to_string()
        };
        ModuleOutcome::with_changed(self.needs_change()).with_msg(msg)
    }
}

enum Step {
    Resolve,
    Diagnose(VpsRecord),
    Preview(BootPlan),
    ApplyChange(BootPlan),
    Reboot(BootPlan),
    Wait(BootPlan),
    Finished(BootPlan),
}

/// Runs the reboot module against an API and a clock.
pub struct RebootModule<'a, A: OvhApi + ?Sized, C: Clock> {
    api: &'a A,
    watcher: TaskWatcher<'a, A, C>,
    cancel: Option<watch::Receiver<bool>>,
}

impl<'a, A: OvhApi + ?Sized, C: Clock> RebootModule<'a, A, C> {
    /// Creates the module with the default poll policy.
    pub fn new(api: &'a A, clock: C) -> Self {
        Self {
            api,
            watcher: TaskWatcher::new(api, clock),
            cancel: None,
        }
    }

    /// Applies the poll policy requested by `args`.
    #[must_use]
    pub fn configured_for(mut self, args: &RebootArgs) -> Self {
        self.watcher = self.watcher.with_policy(args.poll_policy());
        self
    }

    /// Stops the run once `true` is sent on the channel: no further
    /// mutating call is issued and the task wait is abandoned.
    #[must_use]
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.watcher = self.watcher.with_cancel(cancel.clone());
        self.cancel = Some(cancel);
        self
    }

    /// Fails if cancellation was requested.
    fn ensure_not_cancelled(&self, service: &str, plan: &BootPlan) -> Result<(), ModuleError> {
        match &self.cancel {
            Some(cancel) if *cancel.borrow() => Err(ModuleError::Task {
                context: plan.status.clone(),
                source: TaskError::Cancelled {
                    service: service.to_string(),
                },
            }),
            _ => Ok(()),
        }
    }

    /// Returns the task watcher.
    pub const fn watcher(&self) -> &TaskWatcher<'a, A, C> {
        &self.watcher
    }

    /// Executes the module.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::NotFound`] if the service does not exist,
    /// [`ModuleError::Api`] if a provider call fails and
    /// [`ModuleError::Task`] if the task wait fails. Failures after the
    /// current mode is known carry the status text as context.
    pub async fn run(&self, args: &RebootArgs) -> ModuleResult {
        let service = args.service_name.as_str();
        let mut step = Step::Resolve;

        for _ in 0..MAX_STEPS {
            step = match step {
                Step::Resolve => {
                    info!("Fetching VPS {service}");
                    let raw = self
                        .api
                        .get(&vps_path(service))
                        .await
                        .map_err(|e| ModuleError::lookup(service, &e))?;
                    Step::Diagnose(VpsRecord::new(raw))
                }
                Step::Diagnose(record) => {
                    let current = record.netboot_mode().map_err(|e| ModuleError::Api {
                        context: String::new(),
                        message: e.to_string(),
                    })?;
                    let plan = BootPlan::new(current, args.rescue);
                    info!(
                        "VPS {service} boots in {} mode, {} requested",
                        plan.current, plan.target
                    );

                    if args.check_mode {
                        Step::Preview(plan)
                    } else if plan.needs_change() {
                        Step::ApplyChange(plan)
                    } else {
                        Step::Reboot(plan)
                    }
                }
                Step::Preview(plan) => return Ok(plan.preview()),
                Step::ApplyChange(plan) => {
                    self.ensure_not_cancelled(service, &plan)?;
                    info!("Switching {service} netboot mode to {}", plan.target);
                    self.api
                        .put(&vps_path(service), json!({ "netbootMode": plan.target }))
                        .await
                        .map_err(|e| ModuleError::api(plan.status.clone(), &e))?;
                    Step::Reboot(plan)
                }
                Step::Reboot(plan) => {
                    self.ensure_not_cancelled(service, &plan)?;
                    info!("Rebooting {service}");
                    self.api
                        .post(&reboot_path(service), None)
                        .await
                        .map_err(|e| ModuleError::api(plan.status.clone(), &e))?;
                    Step::Wait(plan)
                }
                Step::Wait(plan) => {
                    let report = self
                        .watcher
                        .wait_for_pending_tasks(service)
                        .await
                        .map_err(|source| ModuleError::Task {
                            context: plan.status.clone(),
                            source,
                        })?;
                    debug!(
                        "{} task(s) finished on {service} after {} poll(s)",
                        report.completed.len(),
                        report.polls
                    );
                    Step::Finished(plan)
                }
                Step::Finished(plan) => {
                    return Ok(ModuleOutcome::with_changed(true).with_msg(plan.status));
                }
            };
        }

        Err(ModuleError::Internal(MODULE_NAME))
    }
}
