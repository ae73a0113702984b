//! Caching layer for the estimate feed.
//!
//! Every session polls the same city-wide file, usually within seconds of
//! each other. We cache the decoded table for a short TTL so that N
//! sessions cost one download per interval instead of N. Concurrent misses
//! are collapsed into a single upstream request.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{ArrivalSnapshot, RouteId};
use crate::feed::{EstimateRecord, EstimateSource, FeedError, snapshot_for_route};
use crate::monitor::ArrivalFeed;

/// Cached estimate table entry.
type TableEntry = Arc<Vec<EstimateRecord>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for the cached table.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
        }
    }
}

/// Estimate source with caching.
///
/// Wraps any `EstimateSource` and serves per-route snapshots from the
/// cached city-wide table.
pub struct CachedFeed<S: EstimateSource> {
    source: S,
    table: MokaCache<(), TableEntry>,
}

impl<S: EstimateSource> CachedFeed<S> {
    /// Create a new cached feed.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let table = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Self { source, table }
    }

    /// Get the full estimate table, using the cache if it is fresh.
    pub async fn estimates(&self) -> Result<TableEntry, FeedError> {
        let entry = self
            .table
            .try_get_with((), async {
                debug!("estimate table cache miss");
                self.source.fetch_estimates().await.map(Arc::new)
            })
            .await?;
        Ok(entry)
    }

    /// Access the underlying source for operations that bypass cache.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Invalidate the cached table.
    pub fn invalidate(&self) {
        self.table.invalidate_all();
    }
}

impl<S: EstimateSource> ArrivalFeed for CachedFeed<S> {
    async fn snapshot(&self, route: &RouteId) -> Result<ArrivalSnapshot, FeedError> {
        let table = self.estimates().await?;
        Ok(snapshot_for_route(&table, route))
    }
}
