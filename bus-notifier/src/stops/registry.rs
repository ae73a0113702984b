//! Stop registry rows grouped by route.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, RouteId, StopId};
use crate::feed::StopRecord;

/// One stop as seen from its route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredStop {
    pub id: StopId,
    pub name: String,
    pub direction: Direction,
}

/// The registry indexed by numeric route id.
///
/// The upstream file lists every stop of every route in one flat array;
/// lookups only ever touch one route, so rows are bucketed on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryIndex {
    routes: HashMap<i64, Vec<RegisteredStop>>,
}

impl RegistryIndex {
    pub fn from_records(records: impl IntoIterator<Item = StopRecord>) -> Self {
        let mut routes: HashMap<i64, Vec<RegisteredStop>> = HashMap::new();
        for record in records {
            routes.entry(record.route_id).or_default().push(RegisteredStop {
                id: record.id,
                name: record.name,
                direction: record.direction,
            });
        }
        Self { routes }
    }

    /// The stop with this name and direction on a route.
    ///
    /// Registry order decides between duplicates.
    pub fn find(&self, route: &RouteId, name: &str, direction: Direction) -> Option<StopId> {
        self.routes
            .get(&route.as_numeric()?)?
            .iter()
            .find(|stop| stop.name == name && stop.direction == direction)
            .map(|stop| stop.id)
    }

    /// Stops registered for a route, in registry order.
    pub fn stops_on(&self, route: &RouteId) -> &[RegisteredStop] {
        route
            .as_numeric()
            .and_then(|id| self.routes.get(&id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn stop_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }
}
