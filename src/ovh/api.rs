//! The API seam used by the modules.
//!
//! Modules only talk to the provider through [`OvhApi`], so their control
//! flow can be exercised against a mock instead of a live endpoint.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Raw OVH API operations.
///
/// Paths are relative to the endpoint base URL and may carry a query string
/// (`/vps/foo/tasks?state=doing`). Responses are decoded JSON, `null` for an
/// empty body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OvhApi: Send + Sync {
    /// Issues a `GET`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects it.
    async fn get(&self, path: &str) -> Result<Value>;

    /// Issues a `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects it.
    async fn put(&self, path: &str, body: Value) -> Result<Value>;

    /// Issues a `POST`, with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects it.
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value>;
}

/// Path of a VPS record.
#[must_use]
pub fn vps_path(service: &str) -> String {
    format!("/vps/{service}")
}

/// Path of a VPS service-info record.
#[must_use]
pub fn service_infos_path(service: &str) -> String {
    format!("/vps/{service}/serviceInfos")
}

/// Path of the VPS reboot action.
#[must_use]
pub fn reboot_path(service: &str) -> String {
    format!("/vps/{service}/reboot")
}

/// Path listing the VPS tasks in a given state.
#[must_use]
pub fn tasks_path(service: &str, state: &str) -> String {
    format!("/vps/{service}/tasks?state={state}")
}

/// Path of a single VPS task.
#[must_use]
pub fn task_path(service: &str, task_id: &str) -> String {
    format!("/vps/{service}/tasks/{task_id}")
}
