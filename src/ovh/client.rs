//! OVH API client implementation.
//!
//! This module provides the signed HTTP client for the OVH REST API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, Method, Response};
use secrecy::ExposeSecret;
use serde_json::Value;
use sha1::{Digest, Sha1};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::config::{Credentials, Endpoint};
use crate::error::{ApiError, ConfigError, OvhVpsError, Result};

use super::api::OvhApi;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Response header carrying the provider's request id.
const QUERY_ID_HEADER: &str = "X-Ovh-QueryId";

/// OVH API client.
#[derive(Debug)]
pub struct OvhClient {
    /// HTTP client.
    client: Client,
    /// Endpoint and keys.
    credentials: Credentials,
    /// Server clock minus local clock, fetched on first signed call.
    time_delta: OnceCell<i64>,
}

impl OvhClient {
    /// Creates a new OVH API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_timeout(credentials, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(credentials: Credentials, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            credentials,
            time_delta: OnceCell::new(),
        })
    }

    /// Returns the endpoint this client talks to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.credentials.endpoint
    }

    /// Fetches the provider's current UNIX time (unauthenticated).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not an integer.
    pub async fn server_time(&self) -> Result<i64> {
        let url = self.credentials.endpoint.url("/auth/time");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        let value = Self::decode(response).await?;
        value.as_i64().ok_or_else(|| {
            OvhVpsError::Api(ApiError::invalid_response(format!(
                "unexpected /auth/time payload: {value}"
            )))
        })
    }

    /// Returns the cached clock delta, fetching it on first use.
    ///
    /// A provider error status on `/auth/time` is reported as an invalid
    /// response, never as the status of the signed call that needed it.
    async fn time_delta(&self) -> Result<i64> {
        let delta = self
            .time_delta
            .get_or_try_init(|| async {
                let server = self.server_time().await.map_err(|e| match e {
                    OvhVpsError::Api(ApiError::Network { .. }) => e,
                    other => OvhVpsError::Api(ApiError::invalid_response(format!(
                        "failed to read OVH server time: {}",
                        other.provider_message()
                    ))),
                })?;
                let delta = server - Utc::now().timestamp();
                debug!("OVH clock delta: {delta}s");
                Ok::<i64, OvhVpsError>(delta)
            })
            .await?;

        Ok(*delta)
    }

    /// Executes a single signed request.
    async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.credentials.endpoint.url(path);
        let body_text = match body {
            Some(value) => serde_json::to_string(value)
                .map_err(|e| OvhVpsError::internal(format!("Failed to encode request body: {e}")))?,
            None => String::new(),
        };

        let timestamp = Utc::now().timestamp() + self.time_delta().await?;
        let signature = sign_request(
            self.credentials.application_secret.expose_secret(),
            self.credentials.consumer_key.expose_secret(),
            method.as_str(),
            &url,
            &body_text,
            timestamp,
        );

        trace!("{method} {url}");

        let mut request = self
            .client
            .request(method, &url)
            .header("X-Ovh-Application", &self.credentials.application_key)
            .header("X-Ovh-Consumer", self.credentials.consumer_key.expose_secret())
            .header("X-Ovh-Timestamp", timestamp.to_string())
            .header("X-Ovh-Signature", signature);

        if body.is_some() {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body_text);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        Self::decode(response).await
    }

    /// Turns a response into JSON or the matching [`ApiError`].
    async fn decode(response: Response) -> Result<Value> {
        let status = response.status();
        let query_id = response
            .headers()
            .get(QUERY_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| if text.is_empty() { status.to_string() } else { text });

            let message = match query_id {
                Some(id) => format!("{message}\nOVH-Query-ID: {id}"),
                None => message,
            };

            return Err(ApiError::from_status(status.as_u16(), message).into());
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            OvhVpsError::Api(ApiError::invalid_response(format!(
                "Failed to parse response: {e}"
            )))
        })
    }
}

#[async_trait]
impl OvhApi for OvhClient {
    async fn get(&self, path: &str) -> Result<Value> {
        self.call(Method::GET, path, None).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.call(Method::PUT, path, Some(&body)).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value> {
        let body = body.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        self.call(Method::POST, path, Some(&body)).await
    }
}

/// Computes the `X-Ovh-Signature` header value.
///
/// `url` is the full request URL including the query string and `body` the
/// exact text sent (empty for requests without a body).
#[must_use]
pub fn sign_request(
    application_secret: &str,
    consumer_key: &str,
    method: &str,
    url: &str,
    body: &str,
    timestamp: i64,
) -> String {
    let mut hasher = Sha1::new();
    hasher.update(
        format!("{application_secret}+{consumer_key}+{method}+{url}+{body}+{timestamp}").as_bytes(),
    );
    format!("$1${}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> OvhClient {
        let credentials = Credentials {
            endpoint: Endpoint::parse(&format!("{}/1.0", server.uri())).unwrap(),
            application_key: "app-key".to_string(),
            application_secret: SecretString::from("app-secret".to_string()),
            consumer_key: SecretString::from("consumer-key".to_string()),
        };
        OvhClient::new(credentials).unwrap()
    }

    async fn mount_time(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/1.0/auth/time"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(1_700_000_000)))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_signature_matches_known_vectors() {
        let get = sign_request(
            "app-secret",
            "consumer-key",
            "GET",
            "https://eu.api.ovh.com/1.0/vps/vps1.ovh.net",
            "",
            1_700_000_000,
        );
        assert_eq!(get, "$1$620be787f050d5b968fd880b8a8df0bce2771ce7");

        let put = sign_request(
            "app-secret",
            "consumer-key",
            "PUT",
            "https://eu.api.ovh.com/1.0/vps/vps1.ovh.net",
            r#"{"netbootMode":"local"}"#,
            1_700_000_000,
        );
        assert_eq!(put, "$1$5aa89a7ef8b7b219552b3809a1dbfc5f1028ddf8");
    }

    #[tokio::test]
    async fn test_get_sends_signed_headers() {
        let server = MockServer::start().await;
        mount_time(&server).await;

        Mock::given(method("GET"))
            .and(path("/1.0/vps/vps1.ovh.net"))
            .and(header("X-Ovh-Application", "app-key"))
            .and(header("X-Ovh-Consumer", "consumer-key"))
            .and(header_exists("X-Ovh-Timestamp"))
            .and(header_exists("X-Ovh-Signature"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "vps1.ovh.net", "netbootMode": "local" })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let record = client.get("/vps/vps1.ovh.net").await.unwrap();
        assert_eq!(record["netbootMode"], "local");
    }

    #[tokio::test]
    async fn test_time_delta_is_fetched_once() {
        let server = MockServer::start().await;
        mount_time(&server).await;

        Mock::given(method("GET"))
            .and(path("/1.0/vps/vps1.ovh.net/tasks"))
            .and(query_param("state", "doing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server);
        for _ in 0..2 {
            let ids = client.get("/vps/vps1.ovh.net/tasks?state=doing").await.unwrap();
            assert_eq!(ids, json!([1, 2]));
        }
    }

    #[tokio::test]
    async fn test_put_sends_json_body() {
        let server = MockServer::start().await;
        mount_time(&server).await;

        Mock::given(method("PUT"))
            .and(path("/1.0/vps/vps1.ovh.net"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "netbootMode": "rescue" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client
            .put("/vps/vps1.ovh.net", json!({ "netbootMode": "rescue" }))
            .await
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_post_without_body_sends_empty_object() {
        let server = MockServer::start().await;
        mount_time(&server).await;

        Mock::given(method("POST"))
            .and(path("/1.0/vps/vps1.ovh.net/reboot"))
            .and(body_json(json!({})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": 99, "state": "todo", "type": "rebootVm" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let task = client.post("/vps/vps1.ovh.net/reboot", None).await.unwrap();
        assert_eq!(task["id"], 99);
    }

    #[tokio::test]
    async fn test_not_found_carries_provider_message() {
        let server = MockServer::start().await;
        mount_time(&server).await;

        Mock::given(method("GET"))
            .and(path("/1.0/vps/ghost.ovh.net"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("X-Ovh-QueryId", "EU.ext-1.abc")
                    .set_body_json(json!({
                        "message": "The requested object (serviceName = ghost.ovh.net) does not exist"
                    })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client.get("/vps/ghost.ovh.net").await.unwrap_err();

        assert!(error.is_not_found());
        assert_eq!(
            error.provider_message(),
            "The requested object (serviceName = ghost.ovh.net) does not exist\nOVH-Query-ID: EU.ext-1.abc"
        );
    }

    #[tokio::test]
    async fn test_missing_time_endpoint_is_not_a_missing_service() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.0/auth/time"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Got an invalid (or empty) URL" })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client.get("/vps/vps1.ovh.net").await.unwrap_err();

        assert!(!error.is_not_found());
        assert!(matches!(error, OvhVpsError::Api(ApiError::InvalidResponse { .. })));
        assert!(error.provider_message().contains("Got an invalid (or empty) URL"));

        let module_error = ModuleError::lookup("vps1.ovh.net", &error);
        assert!(matches!(module_error, ModuleError::Api { .. }));
    }

    #[tokio::test]
    async fn test_error_status_mapping() {
        let server = MockServer::start().await;
        mount_time(&server).await;

        Mock::given(method("GET"))
            .and(path("/1.0/vps/vps1.ovh.net/serviceInfos"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "message": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client.get("/vps/vps1.ovh.net/serviceInfos").await.unwrap_err();

        assert!(matches!(
            error,
            OvhVpsError::Api(ApiError::InvalidCredential { ref message }) if message == "Invalid credentials"
        ));
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = MockServer::start().await;
        mount_time(&server).await;

        Mock::given(method("GET"))
            .and(path("/1.0/vps/vps1.ovh.net"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client.get("/vps/vps1.ovh.net").await.unwrap_err();
        assert!(matches!(error, OvhVpsError::Api(ApiError::InvalidResponse { .. })));
    }
}
