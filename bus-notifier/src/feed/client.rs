//! Live estimate feed HTTP client.
//!
//! The operator publishes one gzip file covering every route in the city.
//! The client downloads it, inflates it and filters the rows for a route.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{ArrivalSnapshot, RouteId};
use crate::monitor::ArrivalFeed;

use super::decode::{decode_bus_info, snapshot_for_route};
use super::error::FeedError;
use super::types::EstimateRecord;

/// Default URL of the city-wide estimate feed.
pub const DEFAULT_ESTIMATE_URL: &str =
    "https://tcgbusfs.blob.core.windows.net/blobbus/GetEstimateTime.gz";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Something that can produce the full estimate table.
///
/// This abstraction lets the cache wrap either the HTTP client or a
/// fixture in tests.
pub trait EstimateSource: Send + Sync {
    fn fetch_estimates(
        &self,
    ) -> impl Future<Output = Result<Vec<EstimateRecord>, FeedError>> + Send;
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// URL of the gzip estimate file
    pub estimate_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedClientConfig {
    /// Create a config pointing at the given feed URL.
    pub fn new(estimate_url: impl Into<String>) -> Self {
        Self {
            estimate_url: estimate_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ESTIMATE_URL)
    }
}

/// HTTP client for the estimate feed.
///
/// Uses a semaphore to bound concurrent downloads of the (large) feed file.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    estimate_url: String,
    semaphore: Arc<Semaphore>,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            estimate_url: config.estimate_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// The URL this client downloads from.
    pub fn estimate_url(&self) -> &str {
        &self.estimate_url
    }
}

/// Download a gzip `BusInfo` dataset and return the raw bytes.
///
/// Shared with the stop registry client, which reads a file in the same
/// format from a different URL.
pub(crate) async fn download(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, FeedError> {
    let response = http.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FeedError::Status {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    Ok(response.bytes().await?.to_vec())
}

impl EstimateSource for FeedClient {
    async fn fetch_estimates(&self) -> Result<Vec<EstimateRecord>, FeedError> {
        let _permit = self.semaphore.acquire().await.map_err(|_| FeedError::Status {
            status: 0,
            message: "Semaphore closed".to_string(),
        })?;

        let bytes = download(&self.http, &self.estimate_url).await?;
        let records: Vec<EstimateRecord> = decode_bus_info(&bytes)?;
        debug!(rows = records.len(), "downloaded estimate feed");
        Ok(records)
    }
}

impl ArrivalFeed for FeedClient {
    async fn snapshot(&self, route: &RouteId) -> Result<ArrivalSnapshot, FeedError> {
        let records = self.fetch_estimates().await?;
        Ok(snapshot_for_route(&records, route))
    }
}
