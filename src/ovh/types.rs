//! OVH API types.
//!
//! VPS and service-info records are kept as raw JSON and only the fields the
//! modules act on are interpreted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ApiError;

/// Network boot mode of a VPS.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NetbootMode {
    /// Boot from the local disk.
    Local,
    /// Boot into the rescue image.
    Rescue,
}

impl NetbootMode {
    /// Returns the mode requested by the `rescue` flag.
    #[must_use]
    pub const fn from_rescue(rescue: bool) -> Self {
        if rescue { Self::Rescue } else { Self::Local }
    }

    /// Returns the API name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Rescue => "rescue",
        }
    }
}

impl fmt::Display for NetbootMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A VPS record as returned by `GET /vps/{service}`.
#[derive(Debug, Clone, PartialEq)]
pub struct VpsRecord(Value);

impl VpsRecord {
    /// Wraps a raw record.
    #[must_use]
    pub const fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Returns the current network boot mode.
    ///
    /// # Errors
    ///
    /// Returns an error if `netbootMode` is missing or not a known mode.
    pub fn netboot_mode(&self) -> Result<NetbootMode, ApiError> {
        let raw = self
            .0
            .get("netbootMode")
            .ok_or_else(|| ApiError::invalid_response("VPS record has no netbootMode"))?;

        serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::invalid_response(format!("unexpected netbootMode {raw}: {e}")))
    }
}

/// Opaque provider task identifier.
///
/// The API sends integers; strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawTaskId")]
pub struct TaskId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTaskId {
    Number(u64),
    Text(String),
}

impl From<RawTaskId> for TaskId {
    fn from(raw: RawTaskId) -> Self {
        match raw {
            RawTaskId::Number(n) => Self(n.to_string()),
            RawTaskId::Text(s) => Self(s),
        }
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TaskId {
    /// Returns the id as used in API paths.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of a provider task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TaskState {
    /// Waiting for acknowledgement.
    WaitingAck,
    /// Paused by the provider.
    Paused,
    /// Blocked on another operation.
    Blocked,
    /// Queued.
    Todo,
    /// Running.
    Doing,
    /// Finished successfully.
    Done,
    /// Cancelled before completion.
    Cancelled,
    /// Finished with an error.
    Error,
    /// Any state this crate does not know about.
    Other(String),
}

impl TaskState {
    /// States a task is still working in.
    pub const PENDING: [Self; 5] = [
        Self::WaitingAck,
        Self::Paused,
        Self::Blocked,
        Self::Todo,
        Self::Doing,
    ];

    /// Returns the API name of the state.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::WaitingAck => "waitingAck",
            Self::Paused => "paused",
            Self::Blocked => "blocked",
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
            Self::Other(name) => name,
        }
    }

    /// Returns true while the provider is still working on the task.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::WaitingAck | Self::Paused | Self::Blocked | Self::Todo | Self::Doing
        )
    }

    /// Returns true if the task ended without completing.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Error)
    }
}

impl From<String> for TaskState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "waitingAck" => Self::WaitingAck,
            "paused" => Self::Paused,
            "blocked" => Self::Blocked,
            "todo" => Self::Todo,
            "doing" => Self::Doing,
            "done" => Self::Done,
            "cancelled" => Self::Cancelled,
            "error" => Self::Error,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider task as returned by `GET /vps/{service}/tasks/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    /// Task id.
    pub id: TaskId,
    /// Current state.
    pub state: TaskState,
    /// Operation the task performs (`rebootVm`, `setNetboot`, ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Completion percentage, when reported.
    #[serde(default)]
    pub progress: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_mode_from_rescue_flag() {
        assert_eq!(NetbootMode::from_rescue(true).as_str(), "rescue");
        assert_eq!(NetbootMode::from_rescue(false).as_str(), "local");
    }

    #[test]
    fn test_netboot_mode_from_record() {
        let record = VpsRecord::new(json!({ "name": "vps1.ovh.net", "netbootMode": "rescue" }));
        assert_eq!(record.netboot_mode().unwrap(), NetbootMode::Rescue);
    }

    #[test]
    fn test_netboot_mode_missing_or_unknown() {
        let record = VpsRecord::new(json!({ "name": "vps1.ovh.net" }));
        assert!(matches!(record.netboot_mode(), Err(ApiError::InvalidResponse { .. })));

        let record = VpsRecord::new(json!({ "netbootMode": "network" }));
        assert!(matches!(record.netboot_mode(), Err(ApiError::InvalidResponse { .. })));
    }

    #[test]
    fn test_task_ids_accept_numbers_and_strings() {
        let ids: Vec<TaskId> = serde_json::from_value(json!([42, "t1"])).unwrap();
        assert_eq!(ids[0].as_str(), "42");
        assert_eq!(ids[1].as_str(), "t1");
    }

    #[test]
    fn test_task_state_classification() {
        for state in &TaskState::PENDING {
            assert!(state.is_pending(), "{state} should be pending");
        }
        assert!(!TaskState::Done.is_pending());
        assert!(TaskState::Error.is_failure());
        assert!(TaskState::Cancelled.is_failure());

        let unknown = TaskState::from("customerError".to_string());
        assert!(!unknown.is_pending());
        assert!(!unknown.is_failure());
        assert_eq!(unknown.as_str(), "customerError");
    }

    #[test]
    fn test_task_deserialize() {
        let task: Task = serde_json::from_value(json!({
            "id": 7,
            "state": "doing",
            "type": "rebootVm",
            "progress": 50
        }))
        .unwrap();
        assert_eq!(task.id.as_str(), "7");
        assert_eq!(task.state, TaskState::Doing);
        assert_eq!(task.kind.as_deref(), Some("rebootVm"));
        assert_eq!(task.progress, Some(50));
    }
}
