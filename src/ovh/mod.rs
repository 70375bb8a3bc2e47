//! OVH API integration module.
//!
//! This module provides the signed API client, the [`OvhApi`] seam the
//! modules are written against, the handful of typed fields they read, and
//! the task poller.

mod api;
mod client;
mod tasks;
mod types;

#[cfg(test)]
pub use api::MockOvhApi;
pub use api::{reboot_path, service_infos_path, task_path, tasks_path, vps_path, OvhApi};
pub use client::{sign_request, OvhClient};
pub use tasks::{
    Clock, ManualClock, PollPolicy, TaskWatcher, TokioClock, WaitReport, DEFAULT_POLL_INTERVAL,
    DEFAULT_WAIT_TIMEOUT,
};
pub use types::{NetbootMode, Task, TaskId, TaskState, VpsRecord};
