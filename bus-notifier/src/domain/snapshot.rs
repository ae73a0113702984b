//! Per-route snapshot of live arrival estimates.

use std::collections::HashMap;

use super::StopId;

/// One poll's worth of estimated arrival times for a route.
///
/// Keyed by stop. The feed occasionally lists a stop twice (once per
/// reporting vehicle); the first record wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrivalSnapshot {
    estimates: HashMap<StopId, i64>,
}

impl ArrivalSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(stop, raw estimate)` pairs.
    pub fn from_records(records: impl IntoIterator<Item = (StopId, i64)>) -> Self {
        let mut estimates = HashMap::new();
        for (stop, raw) in records {
            estimates.entry(stop).or_insert(raw);
        }
        Self { estimates }
    }

    /// Raw estimate reported for a stop, if any.
    pub fn get(&self, stop: StopId) -> Option<i64> {
        self.estimates.get(&stop).copied()
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}
