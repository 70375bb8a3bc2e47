//! Error types for the OVH VPS modules.
//!
//! Errors are split by concern: client setup ([`ConfigError`]), individual
//! API calls ([`ApiError`]) and task polling ([`TaskError`]). Module entry
//! points convert these into a [`ModuleError`], which is what ends up in the
//! `msg` field of a failed module result.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the OVH VPS library.
#[derive(Debug, Error)]
pub enum OvhVpsError {
    /// Client setup and argument errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OVH API call errors.
    #[error("OVH API error: {0}")]
    Api(#[from] ApiError),

    /// Task polling errors.
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while resolving credentials, endpoints and arguments.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The endpoint is neither a known alias nor an HTTP(S) URL.
    #[error("Unknown OVH endpoint: {endpoint}")]
    UnknownEndpoint {
        /// The rejected endpoint value.
        endpoint: String,
    },

    /// A credential was not found in arguments, environment or config files.
    #[error("Missing OVH credential: {name}")]
    MissingCredential {
        /// Name of the missing field (`application_key`, ...).
        name: String,
    },

    /// An `ovh.conf` file could not be read or parsed.
    #[error("Invalid OVH config file {path}: {message}")]
    ConfigFile {
        /// Path of the offending file.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// The module arguments file could not be read or parsed.
    #[error("Failed to load module arguments from {path}: {message}")]
    ArgsFile {
        /// Path of the arguments file.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// A module argument is missing or invalid.
    #[error("Invalid argument {field}: {message}")]
    InvalidArgument {
        /// Name of the argument.
        field: String,
        /// Description of the problem.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {message}")]
    HttpClient {
        /// Description of the failure.
        message: String,
    },
}

/// Errors returned by a single OVH API call.
///
/// Provider-reported variants display the provider's own error text, so they
/// can be surfaced verbatim in module results.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource does not exist (HTTP 404).
    #[error("{message}")]
    NotFound {
        /// Provider error text.
        message: String,
    },

    /// The request was rejected as malformed (HTTP 400).
    #[error("{message}")]
    BadParameters {
        /// Provider error text.
        message: String,
    },

    /// The credentials were rejected (HTTP 401/403).
    #[error("{message}")]
    InvalidCredential {
        /// Provider error text.
        message: String,
    },

    /// The resource is in a conflicting state (HTTP 409).
    #[error("{message}")]
    Conflict {
        /// Provider error text.
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Provider error text.
        message: String,
    },

    /// The request never produced a response.
    #[error("Network error communicating with OVH: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("Invalid response from OVH API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Errors raised while waiting for provider tasks.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A task call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Tasks were still pending when the timeout expired.
    #[error("Timed out after {elapsed_secs}s waiting for {pending} task(s) on {service}")]
    Timeout {
        /// Service being polled.
        service: String,
        /// Seconds spent waiting.
        elapsed_secs: u64,
        /// Number of tasks still pending.
        pending: usize,
    },

    /// Tasks were still pending after the maximum number of polls.
    #[error("Gave up on {service} after {polls} polls with {pending} task(s) pending")]
    PollLimit {
        /// Service being polled.
        service: String,
        /// Number of polls performed.
        polls: u32,
        /// Number of tasks still pending.
        pending: usize,
    },

    /// Waiting was cancelled before the tasks finished.
    #[error("Cancelled while waiting for tasks on {service}")]
    Cancelled {
        /// Service being polled.
        service: String,
    },

    /// A task left the pending states in a failure state.
    #[error("Task {task_id} ended in state {state}")]
    Failed {
        /// Provider task id.
        task_id: String,
        /// Terminal state reported by the provider.
        state: String,
    },
}

/// Failure of a whole module invocation.
///
/// The `Display` output is the `msg` reported to Ansible.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The API client could not be set up.
    #[error("OVH API client is unavailable: {reason}")]
    DependencyMissing {
        /// Why the client could not be built.
        reason: String,
    },

    /// The module arguments are missing or invalid.
    #[error("{0}")]
    InvalidArguments(String),

    /// The service is unknown to the provider.
    #[error("service {service} does not exist")]
    NotFound {
        /// The requested service name.
        service: String,
    },

    /// A provider call failed.
    #[error("{context}Failed to call OVH API: {message}")]
    Api {
        /// Status text accumulated before the failure.
        context: String,
        /// Provider error text.
        message: String,
    },

    /// Waiting for provider tasks failed.
    #[error("{context}Failed waiting for OVH tasks: {source}")]
    Task {
        /// Status text accumulated before the failure.
        context: String,
        /// Underlying polling error.
        source: TaskError,
    },

    /// Control flow reached a point that should be unreachable.
    #[error("Internal {0} module error")]
    Internal(&'static str),
}

/// Result type alias for OVH VPS library operations.
pub type Result<T> = std::result::Result<T, OvhVpsError>;

impl OvhVpsError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error means the requested resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(ApiError::NotFound { .. }))
    }

    /// Returns the provider's error text for API errors, or the full
    /// description for anything else.
    #[must_use]
    pub fn provider_message(&self) -> String {
        match self {
            Self::Api(error) => error.to_string(),
            other => other.to_string(),
        }
    }
}

impl ConfigError {
    /// Creates an invalid-argument error for a specific field.
    #[must_use]
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing-credential error.
    #[must_use]
    pub fn missing_credential(name: impl Into<String>) -> Self {
        Self::MissingCredential { name: name.into() }
    }
}

impl ApiError {
    /// Builds the error matching an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound { message },
            400 => Self::BadParameters { message },
            401 | 403 => Self::InvalidCredential { message },
            409 => Self::Conflict { message },
            _ => Self::Http { status, message },
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an invalid-response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

impl ModuleError {
    /// Wraps a setup failure as a missing-dependency error.
    #[must_use]
    pub fn dependency(error: &OvhVpsError) -> Self {
        let reason = match error {
            OvhVpsError::Config(config) => config.to_string(),
            other => other.to_string(),
        };
        Self::DependencyMissing { reason }
    }

    /// Maps an error from looking up a service: 404 becomes [`Self::NotFound`],
    /// anything else a generic API failure.
    #[must_use]
    pub fn lookup(service: &str, error: &OvhVpsError) -> Self {
        if error.is_not_found() {
            Self::NotFound {
                service: service.to_string(),
            }
        } else {
            Self::api(String::new(), error)
        }
    }

    /// Wraps an API failure together with the status text accumulated so far.
    #[must_use]
    pub fn api(context: impl Into<String>, error: &OvhVpsError) -> Self {
        Self::Api {
            context: context.into(),
            message: error.provider_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ApiError::from_status(404, "x"), ApiError::NotFound { .. }));
        assert!(matches!(ApiError::from_status(400, "x"), ApiError::BadParameters { .. }));
        assert!(matches!(ApiError::from_status(403, "x"), ApiError::InvalidCredential { .. }));
        assert!(matches!(ApiError::from_status(409, "x"), ApiError::Conflict { .. }));
        assert!(matches!(
            ApiError::from_status(503, "x"),
            ApiError::Http { status: 503, .. }
        ));
    }

    #[test]
    fn test_lookup_distinguishes_not_found() {
        let missing = OvhVpsError::Api(ApiError::from_status(404, "This service does not exist"));
        let module = ModuleError::lookup("vps1.ovh.net", &missing);
        assert_eq!(module.to_string(), "service vps1.ovh.net does not exist");

        let denied = OvhVpsError::Api(ApiError::from_status(403, "Invalid credentials"));
        let module = ModuleError::lookup("vps1.ovh.net", &denied);
        assert_eq!(module.to_string(), "Failed to call OVH API: Invalid credentials");
    }

    #[test]
    fn test_api_message_keeps_context() {
        let error = OvhVpsError::Api(ApiError::from_status(500, "boom"));
        let module = ModuleError::api("Current mode: local\n", &error);
        assert_eq!(
            module.to_string(),
            "Current mode: local\nFailed to call OVH API: boom"
        );
    }

    #[test]
    fn test_internal_message_names_module() {
        assert_eq!(
            ModuleError::Internal("ovh_vps_reboot").to_string(),
            "Internal ovh_vps_reboot module error"
        );
    }
}
