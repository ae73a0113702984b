//! Collaborator interfaces consumed by the monitoring engine.
//!
//! Production implementations live in [`crate::stops`], [`crate::feed`]
//! and [`crate::cache`]; tests substitute in-memory fixtures. Each trait
//! is also implemented for `Arc<T>` so one value can serve several roles.

use std::future::Future;
use std::sync::Arc;

use crate::domain::{ArrivalSnapshot, Direction, RouteId, StopId, StopSequence};
use crate::feed::FeedError;
use crate::stops::LookupError;

/// Line name → route id.
pub trait RouteLookup: Send + Sync {
    /// `Ok(None)` means the line is not known.
    fn resolve_route(
        &self,
        line: &str,
    ) -> impl Future<Output = Result<Option<RouteId>, LookupError>> + Send;
}

/// (route, stop name, direction) → stop id.
pub trait StopRegistry: Send + Sync {
    /// `Ok(None)` means no stop matches all three.
    fn resolve_stop(
        &self,
        route: &RouteId,
        name: &str,
        direction: Direction,
    ) -> impl Future<Output = Result<Option<StopId>, LookupError>> + Send;
}

/// Route id → ordered stops.
pub trait StopSequenceSource: Send + Sync {
    /// Unknown routes yield an empty sequence.
    fn stop_sequence(
        &self,
        route: &RouteId,
    ) -> impl Future<Output = Result<StopSequence, LookupError>> + Send;
}

/// Live arrival estimates for a route.
pub trait ArrivalFeed: Send + Sync {
    fn snapshot(
        &self,
        route: &RouteId,
    ) -> impl Future<Output = Result<ArrivalSnapshot, FeedError>> + Send;
}

impl<T: RouteLookup> RouteLookup for Arc<T> {
    fn resolve_route(
        &self,
        line: &str,
    ) -> impl Future<Output = Result<Option<RouteId>, LookupError>> + Send {
        (**self).resolve_route(line)
    }
}

impl<T: StopRegistry> StopRegistry for Arc<T> {
    fn resolve_stop(
        &self,
        route: &RouteId,
        name: &str,
        direction: Direction,
    ) -> impl Future<Output = Result<Option<StopId>, LookupError>> + Send {
        (**self).resolve_stop(route, name, direction)
    }
}

impl<T: StopSequenceSource> StopSequenceSource for Arc<T> {
    fn stop_sequence(
        &self,
        route: &RouteId,
    ) -> impl Future<Output = Result<StopSequence, LookupError>> + Send {
        (**self).stop_sequence(route)
    }
}

impl<T: ArrivalFeed> ArrivalFeed for Arc<T> {
    fn snapshot(
        &self,
        route: &RouteId,
    ) -> impl Future<Output = Result<ArrivalSnapshot, FeedError>> + Send {
        (**self).snapshot(route)
    }
}
