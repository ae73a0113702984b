//! Ordered stop list for a route.

use super::StopId;

/// The stops a route serves, in travel order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopSequence(Vec<StopId>);

impl StopSequence {
    pub fn new(stops: Vec<StopId>) -> Self {
        Self(stops)
    }

    /// Position of a stop along the route.
    pub fn position(&self, stop: StopId) -> Option<usize> {
        self.0.iter().position(|s| *s == stop)
    }

    pub fn contains(&self, stop: StopId) -> bool {
        self.0.contains(&stop)
    }

    pub fn get(&self, index: usize) -> Option<StopId> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[StopId] {
        &self.0
    }
}

impl FromIterator<StopId> for StopSequence {
    fn from_iter<I: IntoIterator<Item = StopId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
