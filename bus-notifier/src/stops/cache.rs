//! On-disk copy of the stop registry.
//!
//! The registry changes a few times a year and is several megabytes once
//! inflated, so the indexed form is kept next to the binary between runs.
//! The file records the URL it was downloaded from: pointing the notifier
//! at a different registry makes the old copy a miss.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::LookupError;
use super::registry::RegistryIndex;

/// Default maximum age: 24 hours.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Serialize, Deserialize)]
struct CacheFile<'a> {
    source_url: Cow<'a, str>,
    /// Unix seconds.
    fetched_at: i64,
    registry: Cow<'a, RegistryIndex>,
}

/// Disk cache for the indexed stop registry.
#[derive(Debug, Clone)]
pub struct StopCache {
    path: PathBuf,
    max_age: Duration,
}

impl StopCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached registry, if it was fetched from `source_url` recently
    /// enough. Any unreadable file counts as a miss.
    pub async fn load(&self, source_url: &str) -> Option<RegistryIndex> {
        let bytes = tokio::fs::read(&self.path).await.ok()?;
        let file: CacheFile<'static> = match serde_json::from_slice(&bytes) {
            Ok(file) => file,
            Err(e) => {
                debug!(error = %e, path = %self.path.display(), "ignoring unreadable stop cache");
                return None;
            }
        };

        if file.source_url != source_url {
            debug!(cached = %file.source_url, source_url, "stop cache is for another registry");
            return None;
        }

        let age = Utc::now().timestamp() - file.fetched_at;
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        if !(0..max_age).contains(&age) {
            debug!(age_secs = age, "stop cache expired");
            return None;
        }

        Some(file.registry.into_owned())
    }

    /// Replace the cache file. The new contents are written beside it and
    /// renamed into place, so readers never see a partial file.
    pub async fn store(
        &self,
        source_url: &str,
        registry: &RegistryIndex,
    ) -> Result<(), LookupError> {
        let file = CacheFile {
            source_url: Cow::Borrowed(source_url),
            fetched_at: Utc::now().timestamp(),
            registry: Cow::Borrowed(registry),
        };
        let json = serde_json::to_vec(&file).map_err(|e| LookupError::Cache {
            message: format!("failed to serialize stop registry: {e}"),
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let staging = self.path.with_extension("partial");
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> LookupError {
        LookupError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
