//! Process-wide configuration.
//!
//! Everything has a working default; environment variables override:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `BUS_ESTIMATE_URL` | live estimate feed URL |
//! | `BUS_STOP_URL` | stop registry URL |
//! | `BUS_LINE_TO_ROUTE` | path of `Line_to_Route.json` |
//! | `BUS_ROUTE_TO_STOP` | path of `Route_to_Stop.json` |
//! | `BUS_SESSIONS` | path of the rider sessions file |
//! | `BUS_STOP_CACHE` | stop registry cache file (empty disables) |
//! | `BUS_POLL_SECS` | seconds between polls |
//! | `BUS_DISTANCE_MODE` | `sequence` or `offset` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::domain::Direction;
use crate::feed::{DEFAULT_ESTIMATE_URL, FeedClientConfig};
use crate::monitor::{DEFAULT_POLL_INTERVAL, DistanceMode, MonitorSettings, SessionConfig};
use crate::stops::{DEFAULT_STOP_URL, StopCache, StopClientConfig};

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid number")]
    InvalidNumber { var: &'static str, value: String },

    #[error("BUS_DISTANCE_MODE={0:?}: expected \"sequence\" or \"offset\"")]
    InvalidDistanceMode(String),

    #[error("failed to read sessions file {path}: {source}")]
    SessionsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sessions file {path}: {message}")]
    SessionsJson { path: String, message: String },
}

/// Configuration for the notifier process.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub estimate_url: String,
    pub stop_url: String,
    pub line_to_route_path: PathBuf,
    pub route_to_stop_path: PathBuf,
    pub sessions_path: PathBuf,
    /// `None` disables the stop registry disk cache.
    pub stop_cache_path: Option<PathBuf>,
    pub poll_interval: Duration,
    /// TTL of the shared estimate table.
    pub feed_cache_ttl: Duration,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum concurrent feed downloads.
    pub max_concurrent: usize,
    pub distance_mode: DistanceMode,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            estimate_url: DEFAULT_ESTIMATE_URL.to_string(),
            stop_url: DEFAULT_STOP_URL.to_string(),
            line_to_route_path: PathBuf::from("Line_to_Route.json"),
            route_to_stop_path: PathBuf::from("Route_to_Stop.json"),
            sessions_path: PathBuf::from("sessions.json"),
            stop_cache_path: Some(PathBuf::from("stops_cache.json")),
            poll_interval: DEFAULT_POLL_INTERVAL,
            feed_cache_ttl: CacheConfig::default().ttl,
            timeout_secs: 30,
            max_concurrent: 4,
            distance_mode: DistanceMode::Sequence,
        }
    }
}

impl NotifierConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("BUS_ESTIMATE_URL") {
            config.estimate_url = url;
        }
        if let Some(url) = lookup("BUS_STOP_URL") {
            config.stop_url = url;
        }
        if let Some(path) = lookup("BUS_LINE_TO_ROUTE") {
            config.line_to_route_path = path.into();
        }
        if let Some(path) = lookup("BUS_ROUTE_TO_STOP") {
            config.route_to_stop_path = path.into();
        }
        if let Some(path) = lookup("BUS_SESSIONS") {
            config.sessions_path = path.into();
        }
        if let Some(path) = lookup("BUS_STOP_CACHE") {
            config.stop_cache_path = (!path.is_empty()).then(|| path.into());
        }
        if let Some(value) = lookup("BUS_POLL_SECS") {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidNumber {
                    var: "BUS_POLL_SECS",
                    value,
                })?;
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(mode) = lookup("BUS_DISTANCE_MODE") {
            config.distance_mode = match mode.trim() {
                "sequence" => DistanceMode::Sequence,
                "offset" => DistanceMode::IdentifierOffset,
                _ => return Err(ConfigError::InvalidDistanceMode(mode)),
            };
        }

        Ok(config)
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings::default()
            .with_poll_interval(self.poll_interval)
            .with_distance_mode(self.distance_mode)
    }

    pub fn feed_config(&self) -> FeedClientConfig {
        FeedClientConfig::new(&self.estimate_url)
            .with_max_concurrent(self.max_concurrent)
            .with_timeout(self.timeout_secs)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: self.feed_cache_ttl,
        }
    }

    pub fn stop_client_config(&self) -> StopClientConfig {
        StopClientConfig::new(&self.stop_url)
    }

    pub fn stop_cache(&self) -> Option<StopCache> {
        self.stop_cache_path.as_ref().map(StopCache::new)
    }
}

/// Read rider sessions from a JSON array.
///
/// Returns `Ok(None)` if the file does not exist.
pub async fn load_sessions(path: &Path) -> Result<Option<Vec<SessionConfig>>, ConfigError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::SessionsIo {
                path: path.display().to_string(),
                source,
            });
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| ConfigError::SessionsJson {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Sample riders used when no sessions file is present.
pub fn demo_sessions() -> Vec<SessionConfig> {
    vec![
        SessionConfig::new("672", "博仁醫院", Direction::Inbound, 5, 100),
        SessionConfig::new("615", "新莊高中", Direction::Outbound, 3, 150),
        SessionConfig::new("508區", "永明派出所", Direction::Inbound, 4, 120),
        SessionConfig::new(
            "重慶幹線",
            "捷運芝山站(戲曲中心)",
            Direction::Inbound,
            2,
            130,
        ),
    ]
}
