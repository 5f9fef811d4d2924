//! Outbound HTTP mechanics for the fixed upstream endpoint.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Error type for upstream operations.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The dedicated HTTP client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Build(#[source] reqwest::Error),

    /// The outbound request failed at the transport level
    /// (refused, DNS, timeout).
    #[error("failed to send request to upstream: {0}")]
    Send(#[source] reqwest::Error),
}

/// Forwards event payloads to the upstream API.
///
/// Owns a dedicated client configured to match the relay contract: bounded
/// request timeout, a single reusable idle connection, and no compression.
pub struct Forwarder {
    client: reqwest::Client,
    endpoint: String,
    dev_key: String,
}

impl Forwarder {
    /// Create a forwarder targeting `endpoint` (base URL without trailing
    /// slash), authenticating with `dev_key`.
    pub fn new(endpoint: impl Into<String>, dev_key: impl Into<String>) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .pool_max_idle_per_host(1)
            .pool_idle_timeout(CLIENT_TIMEOUT)
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .build()
            .map_err(UpstreamError::Build)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            dev_key: dev_key.into(),
        })
    }

    /// Target URL for an app bundle id.
    pub fn endpoint_for(&self, app_bundle_id: &str) -> String {
        format!("{}/{}", self.endpoint, app_bundle_id)
    }

    /// Execute the outbound POST, streaming `body` through unmodified.
    pub async fn forward(
        &self,
        app_bundle_id: &str,
        body: reqwest::Body,
    ) -> Result<reqwest::Response, UpstreamError> {
        let endpoint = self.endpoint_for(app_bundle_id);

        self.client
            .post(&endpoint)
            .header("authentication", &self.dev_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(UpstreamError::Send)
    }
}
