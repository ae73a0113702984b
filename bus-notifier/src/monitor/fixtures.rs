//! In-memory transit fixture shared by the runner and scheduler tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::{ArrivalSnapshot, Direction, RouteId, StopId, StopSequence};
use crate::feed::FeedError;
use crate::stops::LookupError;

use super::sources::{ArrivalFeed, RouteLookup, StopRegistry, StopSequenceSource};

/// One scripted feed response.
#[derive(Debug, Clone)]
pub enum Script {
    Snapshot(ArrivalSnapshot),
    Fail,
    Panic,
    /// The request never completes.
    Stall,
}

/// Two routes with five stops each:
/// - line `672` → route `100`, stops 10..=14, target `博仁醫院` (inbound) = 14
/// - line `615` → route `200`, stops 20..=24, target `新莊高中` (outbound) = 24
///
/// Feed responses are scripted per route; once a script runs out the last
/// response repeats.
pub struct FakeTransit {
    lines: HashMap<String, RouteId>,
    stops: Vec<(RouteId, String, Direction, StopId)>,
    sequences: HashMap<RouteId, StopSequence>,
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    last: Mutex<HashMap<String, Script>>,
    polls: Mutex<HashMap<String, usize>>,
    registry_fails: bool,
    registry_delay: Option<Duration>,
}

impl FakeTransit {
    pub fn standard() -> Self {
        let r100 = RouteId::new("100");
        let r200 = RouteId::new("200");
        Self {
            lines: HashMap::from([
                ("672".to_string(), r100.clone()),
                ("615".to_string(), r200.clone()),
            ]),
            stops: vec![
                (r100.clone(), "博仁醫院".to_string(), Direction::Inbound, StopId(14)),
                (r200.clone(), "新莊高中".to_string(), Direction::Outbound, StopId(24)),
            ],
            sequences: HashMap::from([
                (r100, (10..=14).map(StopId).collect()),
                (r200, (20..=24).map(StopId).collect()),
            ]),
            scripts: Mutex::new(HashMap::new()),
            last: Mutex::new(HashMap::new()),
            polls: Mutex::new(HashMap::new()),
            registry_fails: false,
            registry_delay: None,
        }
    }

    pub fn with_script(self, route: &str, script: Vec<Script>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(route.to_string(), script.into());
        self
    }

    pub fn failing_registry(mut self) -> Self {
        self.registry_fails = true;
        self
    }

    /// Every stop lookup waits `delay` before answering.
    pub fn slow_registry(mut self, delay: Duration) -> Self {
        self.registry_delay = Some(delay);
        self
    }

    /// Number of feed requests made for a route.
    pub fn polls(&self, route: &str) -> usize {
        self.polls.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    fn next_script(&self, route: &str) -> Option<Script> {
        *self.polls.lock().unwrap().entry(route.to_string()).or_default() += 1;

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(route)
            .and_then(|queue| queue.pop_front());

        let mut last = self.last.lock().unwrap();
        match next {
            Some(script) => {
                last.insert(route.to_string(), script.clone());
                Some(script)
            }
            None => last.get(route).cloned(),
        }
    }
}

impl RouteLookup for FakeTransit {
    async fn resolve_route(&self, line: &str) -> Result<Option<RouteId>, LookupError> {
        Ok(self.lines.get(line).cloned())
    }
}

impl StopRegistry for FakeTransit {
    async fn resolve_stop(
        &self,
        route: &RouteId,
        name: &str,
        direction: Direction,
    ) -> Result<Option<StopId>, LookupError> {
        if let Some(delay) = self.registry_delay {
            tokio::time::sleep(delay).await;
        }
        if self.registry_fails {
            return Err(LookupError::Json {
                path: "GetStop.gz".to_string(),
                message: "truncated".to_string(),
            });
        }
        Ok(self
            .stops
            .iter()
            .find(|(r, n, d, _)| r == route && n == name && *d == direction)
            .map(|(_, _, _, id)| *id))
    }
}

impl StopSequenceSource for FakeTransit {
    async fn stop_sequence(&self, route: &RouteId) -> Result<StopSequence, LookupError> {
        Ok(self.sequences.get(route).cloned().unwrap_or_default())
    }
}

impl ArrivalFeed for FakeTransit {
    async fn snapshot(&self, route: &RouteId) -> Result<ArrivalSnapshot, FeedError> {
        match self.next_script(route.as_str()) {
            Some(Script::Snapshot(snapshot)) => Ok(snapshot),
            Some(Script::Fail) => Err(FeedError::Status {
                status: 503,
                message: "unavailable".to_string(),
            }),
            Some(Script::Panic) => panic!("feed fixture panicked for route {route}"),
            Some(Script::Stall) => std::future::pending().await,
            None => Ok(ArrivalSnapshot::new()),
        }
    }
}
