//! The Ansible modules.
//!
//! Each module is an async function of an [`OvhApi`](crate::ovh::OvhApi)
//! implementation and its parameter set, returning a [`ModuleResult`].
//! [`connect`] builds the live client from the invocation's credentials.

pub mod args;
pub mod result;
pub mod vps_info;
pub mod vps_reboot;

pub use args::{load_args, parse_args, validate_args, InfoArgs, RebootArgs};
pub use result::{exit_code, to_ansible_json, ModuleOutcome, ModuleResult};
pub use vps_reboot::{BootPlan, RebootModule};

use tracing::debug;

use crate::config::{load_dotenv, CredentialArgs, CredentialResolver};
use crate::error::{ModuleError, OvhVpsError};
use crate::ovh::OvhClient;

/// Builds the API client from module credentials, the environment and the
/// `ovh.conf` files.
///
/// # Errors
///
/// Returns [`ModuleError::DependencyMissing`] if credentials are incomplete
/// or the client cannot be created.
pub fn connect(credentials: CredentialArgs) -> Result<OvhClient, ModuleError> {
    load_dotenv(None).map_err(|e| ModuleError::dependency(&OvhVpsError::from(e)))?;
    connect_with(&CredentialResolver::from_environment(), credentials)
}

/// Builds the API client using an explicit resolver.
///
/// # Errors
///
/// Returns [`ModuleError::DependencyMissing`] if credentials are incomplete
/// or the client cannot be created.
pub fn connect_with(
    resolver: &CredentialResolver,
    credentials: CredentialArgs,
) -> Result<OvhClient, ModuleError> {
    let credentials = resolver
        .resolve(credentials)
        .map_err(|e| ModuleError::dependency(&OvhVpsError::from(e)))?;
    debug!("Using OVH endpoint {}", credentials.endpoint);

    OvhClient::new(credentials).map_err(|e| ModuleError::dependency(&e))
}
