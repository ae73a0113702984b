//! Stop registry HTTP client.

use crate::feed::{FeedError, StopRecord, decode_bus_info, download};

use super::error::LookupError;

/// Default URL of the stop registry.
pub const DEFAULT_STOP_URL: &str = "https://tcgbusfs.blob.core.windows.net/blobbus/GetStop.gz";

/// Configuration for the stop registry client.
#[derive(Debug, Clone)]
pub struct StopClientConfig {
    /// URL of the gzip stop file
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StopClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 60,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for StopClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_URL)
    }
}

/// Client for the operator's stop registry.
#[derive(Debug, Clone)]
pub struct StopClient {
    http: reqwest::Client,
    url: String,
}

impl StopClient {
    /// Create a new stop registry client.
    pub fn new(config: StopClientConfig) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FeedError::from)?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    /// The registry URL this client downloads from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch every stop of every route.
    pub async fn fetch_all(&self) -> Result<Vec<StopRecord>, LookupError> {
        let bytes = download(&self.http, &self.url).await?;
        Ok(decode_bus_info::<StopRecord>(&bytes)?)
    }
}
