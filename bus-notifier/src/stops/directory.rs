//! Stop name lookup.

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::{Direction, RouteId, StopId};
use crate::feed::StopRecord;
use crate::monitor::StopRegistry;

use super::cache::StopCache;
use super::client::StopClient;
use super::error::LookupError;
use super::registry::RegistryIndex;

/// Where a lazily-loaded directory gets its registry from.
struct RegistrySource {
    client: StopClient,
    cache: Option<StopCache>,
}

/// Shared (route, name, direction) → stop lookup.
///
/// The remote registry is downloaded on first use and then shared by
/// every session. A failed download is not remembered, so the next
/// session to resolve a stop tries again.
pub struct StopDirectory {
    registry: OnceCell<RegistryIndex>,
    source: Option<RegistrySource>,
}

impl StopDirectory {
    /// Directory backed by the remote registry, with an optional disk cache.
    pub fn remote(client: StopClient, cache: Option<StopCache>) -> Self {
        Self {
            registry: OnceCell::new(),
            source: Some(RegistrySource { client, cache }),
        }
    }

    /// Directory over a fixed set of rows.
    pub fn from_records(records: Vec<StopRecord>) -> Self {
        Self {
            registry: OnceCell::new_with(Some(RegistryIndex::from_records(records))),
            source: None,
        }
    }

    async fn registry(&self) -> Result<&RegistryIndex, LookupError> {
        self.registry.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<RegistryIndex, LookupError> {
        let Some(source) = &self.source else {
            return Ok(RegistryIndex::default());
        };
        let url = source.client.url();

        if let Some(cache) = &source.cache
            && let Some(registry) = cache.load(url).await
        {
            info!(
                routes = registry.route_count(),
                path = %cache.path().display(),
                "loaded stop registry from cache"
            );
            return Ok(registry);
        }

        let registry = RegistryIndex::from_records(source.client.fetch_all().await?);
        info!(
            routes = registry.route_count(),
            stops = registry.stop_count(),
            "downloaded stop registry"
        );

        if let Some(cache) = &source.cache
            && let Err(e) = cache.store(url, &registry).await
        {
            warn!(error = %e, "failed to write stop registry cache");
        }

        Ok(registry)
    }
}

impl StopRegistry for StopDirectory {
    async fn resolve_stop(
        &self,
        route: &RouteId,
        name: &str,
        direction: Direction,
    ) -> Result<Option<StopId>, LookupError> {
        Ok(self.registry().await?.find(route, name, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stops::StopClientConfig;

    const UNREACHABLE: &str = "http://127.0.0.1:9/GetStop.gz";

    fn stop(id: u32, route_id: i64, name: &str, direction: Direction) -> StopRecord {
        StopRecord {
            id: StopId(id),
            route_id,
            name: name.to_string(),
            direction,
        }
    }

    fn rows() -> Vec<StopRecord> {
        vec![
            stop(100, 16111, "博仁醫院", Direction::Outbound),
            stop(200, 16111, "博仁醫院", Direction::Inbound),
            stop(300, 10723, "博仁醫院", Direction::Inbound),
        ]
    }

    fn unreachable_client() -> StopClient {
        StopClient::new(StopClientConfig::new(UNREACHABLE).with_timeout(1)).unwrap()
    }

    #[tokio::test]
    async fn in_memory_directory_resolves() {
        let directory = StopDirectory::from_records(rows());
        let found = directory
            .resolve_stop(&RouteId::new("16111"), "博仁醫院", Direction::Inbound)
            .await
            .unwrap();
        assert_eq!(found, Some(StopId(200)));

        let missing = directory
            .resolve_stop(&RouteId::new("16111"), "新莊高中", Direction::Inbound)
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn remote_directory_prefers_fresh_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StopCache::new(dir.path().join("stops.json"));
        cache
            .store(UNREACHABLE, &RegistryIndex::from_records(rows()))
            .await
            .unwrap();

        // The URL is unreachable, so a hit proves the cache was used.
        let directory = StopDirectory::remote(unreachable_client(), Some(cache));

        let found = directory
            .resolve_stop(&RouteId::new("10723"), "博仁醫院", Direction::Inbound)
            .await
            .unwrap();
        assert_eq!(found, Some(StopId(300)));
    }

    #[tokio::test]
    async fn cache_from_another_registry_is_not_used() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StopCache::new(dir.path().join("stops.json"));
        cache
            .store(
                "http://old-mirror.local/GetStop.gz",
                &RegistryIndex::from_records(rows()),
            )
            .await
            .unwrap();

        let directory = StopDirectory::remote(unreachable_client(), Some(cache));

        let result = directory
            .resolve_stop(&RouteId::new("10723"), "博仁醫院", Direction::Inbound)
            .await;
        assert!(matches!(result, Err(LookupError::Feed(_))));
    }

    #[tokio::test]
    async fn remote_failure_is_lookup_error() {
        let directory = StopDirectory::remote(unreachable_client(), None);

        let result = directory
            .resolve_stop(&RouteId::new("16111"), "博仁醫院", Direction::Inbound)
            .await;
        assert!(matches!(result, Err(LookupError::Feed(_))));
    }
}
