//! Forwarding of chat completion requests to the upstream model API

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::domain::DomainError;

/// Status and raw body returned by the upstream API
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Client for the OpenAI-compatible chat completions endpoint behind the cache
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    completions_url: String,
    auth_header: Option<String>,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.base_url, &config.api_key))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            completions_url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            auth_header: (!api_key.is_empty()).then(|| format!("Bearer {}", api_key)),
        }
    }

    /// Send the caller's body unchanged and relay whatever comes back
    ///
    /// The configured key wins; without one the caller's `Authorization`
    /// header is passed through. Non-2xx statuses are returned, not raised.
    pub async fn forward_chat(
        &self,
        body: Bytes,
        caller_authorization: Option<&str>,
    ) -> Result<UpstreamResponse, DomainError> {
        let mut request = self
            .client
            .post(&self.completions_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(auth) = self.auth_header.as_deref().or(caller_authorization) {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::provider("upstream", format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            DomainError::provider("upstream", format!("Failed to read response: {}", e))
        })?;

        debug!(status, bytes = body.len(), "Upstream responded");

        Ok(UpstreamResponse { status, body })
    }
}
