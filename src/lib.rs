// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![warn(missing_docs)]                // All public items should be documented
#![warn(dead_code)]                   // Unused code should be removed
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![warn(unused_imports)]              // Unused imports should be removed
#![warn(unused_variables)]            // Unused variables should be removed
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// Tests assert with unwrap/panic freely
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

// ============================================================================
// Crate Documentation
// ============================================================================

//! # OVH VPS Modules
//!
//! Ansible modules for inspecting and rebooting OVH VPS instances.
//!
//! ## Overview
//!
//! Two binaries are built from this crate:
//!
//! - `ovh_vps_info` reads a VPS record and its service info
//! - `ovh_vps_reboot` sets the VPS netboot mode (`local` or `rescue`),
//!   reboots it, and waits until the provider has finished its tasks
//!
//! Each binary follows the Ansible binary-module contract: it takes the path
//! of a JSON arguments file and prints a JSON result on stdout. The same
//! parameters can be given as flags for direct use.
//!
//! ## Credentials
//!
//! The endpoint and keys are taken from the module arguments, then the
//! `OVH_ENDPOINT`, `OVH_APPLICATION_KEY`, `OVH_APPLICATION_SECRET` and
//! `OVH_CONSUMER_KEY` environment variables, then `ovh.conf`.
//!
//! ## Modules
//!
//! - [`config`]: Endpoints and credential resolution
//! - [`ovh`]: Signed API client, typed fields and the task poller
//! - [`modules`]: The two Ansible modules and their parameters
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types
//!
//! ## Example
//!
//! ```yaml
//! - name: Boot the VPS into rescue mode
//!   ovh_vps_reboot:
//!     service_name: vps123456.ovh.net
//!     rescue: true
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod modules;
pub mod ovh;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{InfoCli, OutputFormatter, RebootCli};
pub use config::{CredentialArgs, CredentialResolver, Credentials, Endpoint};
pub use error::{ApiError, ConfigError, ModuleError, OvhVpsError, Result, TaskError};
pub use modules::{InfoArgs, ModuleOutcome, ModuleResult, RebootArgs, RebootModule};
pub use ovh::{OvhApi, OvhClient, PollPolicy, TaskWatcher};
