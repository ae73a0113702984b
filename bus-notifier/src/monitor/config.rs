//! Rider session configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::Direction;

use super::index::DistanceMode;

/// Default time between polls of the live feed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Error returned when a rider configuration is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid session config: {0}")]
pub struct InvalidSessionConfig(&'static str);

/// One rider's monitoring request. Immutable once created.
///
/// Deserialises from camelCase keys; the snake_case keys of older
/// session files (`bus_id`, `target_stop`) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Public line name, e.g. `672`.
    #[serde(alias = "bus_id", alias = "line_id")]
    pub line_id: String,

    /// Name of the stop the rider is waiting at.
    #[serde(alias = "target_stop", alias = "target_stop_name")]
    pub target_stop_name: String,

    pub direction: Direction,

    /// Warn when the vehicle is this many stops before the target.
    #[serde(alias = "notify_distance")]
    pub notify_distance: u32,

    /// Countdown (seconds) below which the rider is notified.
    #[serde(alias = "time_threshold")]
    pub time_threshold: u64,
}

impl SessionConfig {
    pub fn new(
        line_id: impl Into<String>,
        target_stop_name: impl Into<String>,
        direction: Direction,
        notify_distance: u32,
        time_threshold: u64,
    ) -> Self {
        Self {
            line_id: line_id.into(),
            target_stop_name: target_stop_name.into(),
            direction,
            notify_distance,
            time_threshold,
        }
    }

    /// Short human-readable name used in logs and notifications.
    pub fn label(&self) -> String {
        format!("{} @ {}", self.line_id, self.target_stop_name)
    }

    pub fn validate(&self) -> Result<(), InvalidSessionConfig> {
        if self.line_id.trim().is_empty() {
            return Err(InvalidSessionConfig("line id is empty"));
        }
        if self.target_stop_name.trim().is_empty() {
            return Err(InvalidSessionConfig("target stop name is empty"));
        }
        if self.time_threshold == 0 {
            return Err(InvalidSessionConfig("time threshold must be positive"));
        }
        Ok(())
    }
}

/// Engine-wide settings shared by every session.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Time between polls.
    pub poll_interval: Duration,

    /// How "N stops before the target" is computed.
    pub distance_mode: DistanceMode,
}

impl MonitorSettings {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_distance_mode(mut self, mode: DistanceMode) -> Self {
        self.distance_mode = mode;
        self
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            distance_mode: DistanceMode::Sequence,
        }
    }
}
