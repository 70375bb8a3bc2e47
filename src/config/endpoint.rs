//! OVH API endpoint resolution.
//!
//! Endpoints are named by region alias (`ovh-eu`, `ovh-ca`, ...) as in
//! `ovh.conf`. A full `http(s)://` URL is also accepted, which is how tests
//! point the client at a local mock server.

use std::fmt;

use crate::error::ConfigError;

/// Known endpoint aliases and their API base URLs.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("ovh-eu", "https://eu.api.ovh.com/1.0"),
    ("ovh-us", "https://api.us.ovhcloud.com/1.0"),
    ("ovh-ca", "https://ca.api.ovh.com/1.0"),
    ("kimsufi-eu", "https://eu.api.kimsufi.com/1.0"),
    ("kimsufi-ca", "https://ca.api.kimsufi.com/1.0"),
    ("soyoustart-eu", "https://eu.api.soyoustart.com/1.0"),
    ("soyoustart-ca", "https://ca.api.soyoustart.com/1.0"),
];

/// A resolved OVH API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Name the endpoint was given by (alias or URL).
    name: String,
    /// API base URL without a trailing slash.
    base_url: String,
}

impl Endpoint {
    /// Resolves an endpoint alias or URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a known alias nor an HTTP(S) URL.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();

        if value.starts_with("http://") || value.starts_with("https://") {
            return Ok(Self {
                name: value.to_string(),
                base_url: value.trim_end_matches('/').to_string(),
            });
        }

        ENDPOINTS
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(value))
            .map(|(alias, url)| Self {
                name: (*alias).to_string(),
                base_url: (*url).to_string(),
            })
            .ok_or_else(|| ConfigError::UnknownEndpoint {
                endpoint: value.to_string(),
            })
    }

    /// Returns the name the endpoint was configured with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL for an API path such as `/vps/foo`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
