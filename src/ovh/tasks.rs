//! Waiting for provider tasks.
//!
//! After a mutating call the provider queues asynchronous tasks on the VPS.
//! [`TaskWatcher`] snapshots the pending task ids once, then polls each one
//! until every tracked task has left the pending states.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ApiError, OvhVpsError, TaskError};

use super::api::{task_path, tasks_path, OvhApi};
use super::types::{Task, TaskId, TaskState};

/// Default delay between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound on the whole wait.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Source of time for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;

    /// Sleeps for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that advances instantly and records every sleep.
#[derive(Debug)]
pub struct ManualClock {
    /// Instant the clock was created at.
    origin: Instant,
    /// Sleeps performed so far.
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Creates a clock starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Returns the sleeps performed so far.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn elapsed(&self) -> Duration {
        self.sleeps
            .lock()
            .map(|s| s.iter().sum())
            .unwrap_or_default()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two polls.
    pub interval: Duration,
    /// Give up once this much time has passed; `None` waits forever.
    pub timeout: Option<Duration>,
    /// Give up after this many polls; `None` means no limit.
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_WAIT_TIMEOUT),
            max_polls: None,
        }
    }
}

impl PollPolicy {
    /// Sets the poll interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the overall timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of polls.
    #[must_use]
    pub const fn with_max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, Default)]
pub struct WaitReport {
    /// Tasks observed in a terminal state, in completion order.
    pub completed: Vec<Task>,
    /// Number of poll passes over the tracked tasks.
    pub polls: u32,
}

/// Polls the task queue of one VPS until it drains.
pub struct TaskWatcher<'a, A: OvhApi + ?Sized, C: Clock> {
    api: &'a A,
    clock: C,
    policy: PollPolicy,
    cancel: Option<watch::Receiver<bool>>,
}

impl<'a, A: OvhApi + ?Sized, C: Clock> TaskWatcher<'a, A, C> {
    /// Creates a watcher with the default policy.
    pub fn new(api: &'a A, clock: C) -> Self {
        Self {
            api,
            clock,
            policy: PollPolicy::default(),
            cancel: None,
        }
    }

    /// Sets the poll policy.
    #[must_use]
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stops waiting as soon as `true` is sent on the channel.
    #[must_use]
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns the clock driving the loop.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Lists the ids of every task of `service` in a pending state.
    ///
    /// # Errors
    ///
    /// Returns an error if a listing call fails or returns something other
    /// than a list of ids.
    pub async fn pending_task_ids(&self, service: &str) -> Result<Vec<TaskId>, TaskError> {
        let mut ids = Vec::new();

        for state in &TaskState::PENDING {
            let raw = self
                .api
                .get(&tasks_path(service, state.as_str()))
                .await
                .map_err(into_task_error)?;

            let batch: Vec<TaskId> = serde_json::from_value(raw).map_err(|e| {
                ApiError::invalid_response(format!("unexpected task list for state {state}: {e}"))
            })?;

            for id in batch {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        Ok(ids)
    }

    /// Fetches a single task.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the task cannot be decoded.
    pub async fn fetch_task(&self, service: &str, id: &TaskId) -> Result<Task, TaskError> {
        let raw = self
            .api
            .get(&task_path(service, id.as_str()))
            .await
            .map_err(into_task_error)?;

        serde_json::from_value(raw)
            .map_err(|e| ApiError::invalid_response(format!("unexpected task {id}: {e}")).into())
    }

    /// Waits until no task of `service` is pending.
    ///
    /// The pending set is captured once; each pass re-reads every tracked
    /// task and drops those in a terminal state. The loop returns as soon as
    /// the set is empty, without a trailing sleep.
    ///
    /// # Errors
    ///
    /// Returns an error if a call fails, a task ends in `error` or
    /// `cancelled`, the policy limits are exceeded, or the wait is cancelled.
    pub async fn wait_for_pending_tasks(&self, service: &str) -> Result<WaitReport, TaskError> {
        let started = self.clock.now();
        let mut tracked = self.pending_task_ids(service).await?;
        let mut report = WaitReport::default();

        info!("Waiting for {} pending task(s) on {service}", tracked.len());

        while !tracked.is_empty() {
            report.polls += 1;

            let mut still_pending = Vec::with_capacity(tracked.len());
            for id in tracked {
                let task = self.fetch_task(service, &id).await?;

                if task.state.is_pending() {
                    match task.progress {
                        Some(progress) => {
                            debug!("Task {id} on {service} is {} ({progress}%)", task.state);
                        }
                        None => debug!("Task {id} on {service} is {}", task.state),
                    }
                    still_pending.push(id);
                } else if task.state.is_failure() {
                    warn!("Task {id} on {service} ended in state {}", task.state);
                    return Err(TaskError::Failed {
                        task_id: id.to_string(),
                        state: task.state.to_string(),
                    });
                } else {
                    debug!("Task {id} on {service} finished: {}", task.state);
                    report.completed.push(task);
                }
            }
            tracked = still_pending;

            if tracked.is_empty() {
                break;
            }

            if let Some(max_polls) = self.policy.max_polls {
                if report.polls >= max_polls {
                    return Err(TaskError::PollLimit {
                        service: service.to_string(),
                        polls: report.polls,
                        pending: tracked.len(),
                    });
                }
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            if let Some(timeout) = self.policy.timeout {
                if elapsed >= timeout {
                    return Err(TaskError::Timeout {
                        service: service.to_string(),
                        elapsed_secs: elapsed.as_secs(),
                        pending: tracked.len(),
                    });
                }
            }

            if self.pause().await {
                return Err(TaskError::Cancelled {
                    service: service.to_string(),
                });
            }
        }

        info!("All tasks on {service} finished after {} poll(s)", report.polls);
        Ok(report)
    }

    /// Sleeps one interval; returns true if cancelled instead.
    async fn pause(&self) -> bool {
        let Some(cancel) = self.cancel.clone() else {
            self.clock.sleep(self.policy.interval).await;
            return false;
        };

        if *cancel.borrow() {
            return true;
        }

        tokio::select! {
            () = self.clock.sleep(self.policy.interval) => false,
            () = cancelled(cancel) => true,
        }
    }
}

/// Resolves once `true` is sent; never resolves if the sender is dropped.
async fn cancelled(mut cancel: watch::Receiver<bool>) {
    if cancel.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn into_task_error(error: OvhVpsError) -> TaskError {
    match error {
        OvhVpsError::Api(api) => TaskError::Api(api),
        other => TaskError::Api(ApiError::invalid_response(other.to_string())),
    }
}
