//! "N stops before the target" lookup.

use crate::domain::{StopId, StopSequence};

/// How the stop `N` before the target is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    /// Walk back `N` positions along the route's stop sequence.
    #[default]
    Sequence,
    /// Subtract `N` from the target's stop id and require the result to be
    /// on the route. Only meaningful for feeds that number stops
    /// consecutively along each route.
    IdentifierOffset,
}

/// Answers which stop is `N` stops before a target on one route.
#[derive(Debug, Clone)]
pub struct StopDistanceIndex {
    target: StopId,
    stops: StopSequence,
    mode: DistanceMode,
    /// Cached position of the target in `stops`.
    target_pos: Option<usize>,
}

impl StopDistanceIndex {
    pub fn new(target: StopId, stops: StopSequence, mode: DistanceMode) -> Self {
        let target_pos = stops.position(target);
        Self {
            target,
            stops,
            mode,
            target_pos,
        }
    }

    pub fn target(&self) -> StopId {
        self.target
    }

    /// The stop `distance` stops before the target, if the route has one.
    pub fn watched_stop(&self, distance: u32) -> Option<StopId> {
        match self.mode {
            DistanceMode::Sequence => {
                let pos = self.target_pos?;
                let back = usize::try_from(distance).ok()?;
                self.stops.get(pos.checked_sub(back)?)
            }
            DistanceMode::IdentifierOffset => self
                .target
                .offset_back(distance)
                .filter(|stop| self.stops.contains(*stop)),
        }
    }

    /// Whether `stop` is exactly `distance` stops before the target.
    pub fn is_nth_before(&self, stop: StopId, distance: u32) -> bool {
        self.watched_stop(distance) == Some(stop)
    }
}
