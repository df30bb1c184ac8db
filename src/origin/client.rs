//! HTTP client for the fixed calendar origin.

use std::time::Duration;

use url::Url;

use crate::config::{OriginConfig, TimeoutConfig};
use crate::http::error::ProxyError;

/// Build the origin URL for an inbound path.
///
/// The path is appended to the base as-is: no sanitizing, no re-encoding.
pub fn origin_url(base_url: &str, path: &str) -> Result<Url, ProxyError> {
    let joined = format!("{base_url}{path}");
    Url::parse(&joined).map_err(|source| ProxyError::InvalidUrl { url: joined, source })
}

/// Client that resolves inbound paths against the origin and fetches them.
#[derive(Debug, Clone)]
pub struct OriginClient {
    client: reqwest::Client,
    base_url: String,
}

impl OriginClient {
    /// Build a client from configuration.
    pub fn new(origin: &OriginConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(origin.user_agent.as_str())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()?;

        Ok(Self::with_client(client, origin.base_url.clone()))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET for `path` against the origin.
    ///
    /// Any status the origin answers with is returned as a response; only
    /// transport failures are errors.
    pub async fn fetch(&self, path: &str) -> Result<reqwest::Response, ProxyError> {
        let url = origin_url(&self.base_url, path)?;
        tracing::debug!(url = %url, "Fetching from origin");

        let response = self.client.get(url).send().await?;
        Ok(response)
    }
}
