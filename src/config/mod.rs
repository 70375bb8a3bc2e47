//! Configuration module for the OVH VPS modules.
//!
//! This module handles everything needed before a client can be built:
//! - Endpoint alias resolution
//! - Credential resolution (arguments, environment, `ovh.conf`)
//! - Loading `ovh.conf` and `.env` files

mod credentials;
mod endpoint;
mod parser;

pub use credentials::{
    CredentialArgs, CredentialResolver, Credentials, ENV_APPLICATION_KEY, ENV_APPLICATION_SECRET,
    ENV_CONSUMER_KEY, ENV_ENDPOINT,
};
pub use endpoint::{Endpoint, ENDPOINTS};
pub use parser::{default_config_paths, load_dotenv, OvhConfigFile, CONFIG_FILE_NAME};
