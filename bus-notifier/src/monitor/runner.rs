//! Single-session lifecycle: resolve identifiers once, then poll.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::{Direction, RouteId};
use crate::notify::{Notification, NotificationSink};
use crate::stops::LookupError;

use super::config::{InvalidSessionConfig, MonitorSettings, SessionConfig};
use super::index::StopDistanceIndex;
use super::machine::{Approach, SessionOutcome, SessionStateMachine, TickOutcome};
use super::sources::{ArrivalFeed, RouteLookup, StopRegistry, StopSequenceSource};

/// Errors that end a session before it reaches a normal outcome.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidConfig(#[from] InvalidSessionConfig),

    /// The line table has no route for this line
    #[error("route for line {line} not found")]
    RouteNotFound { line: String },

    /// No stop matched name, direction and route
    #[error("stop {name:?} ({direction}) not found on route {route}")]
    StopNotFound {
        route: RouteId,
        name: String,
        direction: Direction,
    },

    /// Lookup data could not be loaded
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// The session task panicked or was aborted
    #[error("session crashed: {0}")]
    Crashed(String),
}

/// Everything a session talks to.
///
/// `tables` answers both route and stop-sequence lookups, matching the
/// static JSON files that carry both.
pub struct Collaborators<T, R, F, N> {
    pub tables: T,
    pub registry: R,
    pub feed: F,
    pub sink: N,
}

/// Sending half of a cancellation signal shared by many sessions.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Ask every session holding a token from this handle to stop.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// A receiver for one session.
    pub fn token(&self) -> Cancellation {
        Cancellation {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of a cancellation signal.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Drives one session from configuration to a terminal outcome.
pub struct SessionRunner<T, R, F, N> {
    services: Arc<Collaborators<T, R, F, N>>,
    settings: MonitorSettings,
    cancel: Cancellation,
}

impl<T, R, F, N> SessionRunner<T, R, F, N>
where
    T: RouteLookup + StopSequenceSource,
    R: StopRegistry,
    F: ArrivalFeed,
    N: NotificationSink,
{
    pub fn new(
        services: Arc<Collaborators<T, R, F, N>>,
        settings: MonitorSettings,
        cancel: Cancellation,
    ) -> Self {
        Self {
            services,
            settings,
            cancel,
        }
    }

    /// Run the session until it notifies, gives up or is cancelled.
    ///
    /// Resolution failures end the session with an error. Feed failures
    /// during polling are logged and the tick is skipped.
    pub async fn run(mut self, config: &SessionConfig) -> Result<SessionOutcome, SessionError> {
        config.validate()?;

        // Lookups can block on a registry download, so they race the token too.
        let mut cancel = self.cancel.clone();
        let (route, machine) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(SessionOutcome::Cancelled),
            prepared = self.prepare(config) => prepared?,
        };
        self.poll(config, &route, machine).await
    }

    /// Resolve route, target stop and stop sequence.
    async fn prepare(
        &self,
        config: &SessionConfig,
    ) -> Result<(RouteId, SessionStateMachine), SessionError> {
        let route = self
            .services
            .tables
            .resolve_route(&config.line_id)
            .await?
            .ok_or_else(|| SessionError::RouteNotFound {
                line: config.line_id.clone(),
            })?;

        let target = self
            .services
            .registry
            .resolve_stop(&route, &config.target_stop_name, config.direction)
            .await?
            .ok_or_else(|| SessionError::StopNotFound {
                route: route.clone(),
                name: config.target_stop_name.clone(),
                direction: config.direction,
            })?;

        let stops = self.services.tables.stop_sequence(&route).await?;
        info!(%route, %target, stops = stops.len(), "session resolved");

        let index = StopDistanceIndex::new(target, stops, self.settings.distance_mode);
        let machine =
            SessionStateMachine::new(index, config.notify_distance, config.time_threshold);
        Ok((route, machine))
    }

    async fn poll(
        &mut self,
        config: &SessionConfig,
        route: &RouteId,
        mut machine: SessionStateMachine,
    ) -> Result<SessionOutcome, SessionError> {
        loop {
            let polled = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(SessionOutcome::Cancelled),
                polled = self.services.feed.snapshot(route) => polled,
            };

            match polled {
                Ok(snapshot) => {
                    debug!(stops = snapshot.len(), "snapshot received");
                    match machine.tick(&snapshot) {
                        TickOutcome::Notify(approach) => {
                            self.deliver(config, approach);
                            return Ok(SessionOutcome::Notified);
                        }
                        TickOutcome::Terminate => {
                            let outcome =
                                machine.outcome().unwrap_or(SessionOutcome::DistanceExhausted);
                            info!(?outcome, "session finished");
                            return Ok(outcome);
                        }
                        TickOutcome::Continue => {}
                    }
                }
                Err(e) => {
                    warn!(error = %e, "feed poll failed, retrying next interval");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
                _ = self.cancel.cancelled() => return Ok(SessionOutcome::Cancelled),
            }
        }
    }

    fn deliver(&self, config: &SessionConfig, approach: Approach) {
        let notification = Notification {
            session: config.label(),
            line: config.line_id.clone(),
            stop_name: config.target_stop_name.clone(),
            distance: approach.distance,
            estimate_secs: approach.estimate_secs,
            issued_at: Local::now(),
        };
        info!(stop = %approach.stop, distance = approach.distance, "vehicle approaching");
        self.services.sink.deliver(&notification);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{ArrivalSnapshot, StopId};
    use crate::monitor::fixtures::{FakeTransit, Script};
    use crate::notify::MemorySink;

    type Services = Collaborators<Arc<FakeTransit>, Arc<FakeTransit>, Arc<FakeTransit>, MemorySink>;

    fn services(transit: FakeTransit) -> Arc<Services> {
        let transit = Arc::new(transit);
        Arc::new(Collaborators {
            tables: transit.clone(),
            registry: transit.clone(),
            feed: transit,
            sink: MemorySink::new(),
        })
    }

    type Runner = SessionRunner<Arc<FakeTransit>, Arc<FakeTransit>, Arc<FakeTransit>, MemorySink>;

    fn runner(services: &Arc<Services>) -> Runner {
        SessionRunner::new(
            services.clone(),
            MonitorSettings::default(),
            Cancellation::never(),
        )
    }

    fn config() -> SessionConfig {
        SessionConfig::new("672", "博仁醫院", Direction::Inbound, 2, 100)
    }

    fn snapshot(records: &[(u32, i64)]) -> Script {
        Script::Snapshot(ArrivalSnapshot::from_records(
            records.iter().map(|(s, t)| (StopId(*s), *t)),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn notifies_once_vehicle_is_close() {
        let transit = FakeTransit::standard().with_script(
            "100",
            vec![snapshot(&[(12, 400)]), snapshot(&[(12, 150)]), snapshot(&[(12, 80)])],
        );
        let services = services(transit);

        let outcome = runner(&services).run(&config()).await.unwrap();

        assert_eq!(outcome, SessionOutcome::Notified);
        let delivered = services.sink.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].line, "672");
        assert_eq!(delivered[0].stop_name, "博仁醫院");
        assert_eq!(delivered[0].distance, 2);
        assert_eq!(delivered[0].estimate_secs, 80);
        assert_eq!(services.feed.polls("100"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_fixed_interval() {
        let transit = FakeTransit::standard()
            .with_script("100", vec![snapshot(&[(12, 400)]), snapshot(&[(12, 50)])]);
        let services = services(transit);

        let start = tokio::time::Instant::now();
        runner(&services).run(&config()).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(60) && elapsed < Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn feed_failure_skips_tick() {
        let transit = FakeTransit::standard()
            .with_script("100", vec![Script::Fail, Script::Fail, snapshot(&[(12, 30)])]);
        let services = services(transit);

        let outcome = runner(&services).run(&config()).await.unwrap();

        assert_eq!(outcome, SessionOutcome::Notified);
        assert_eq!(services.feed.polls("100"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn service_suspended_ends_quietly() {
        let transit = FakeTransit::standard().with_script("100", vec![snapshot(&[(12, -4)])]);
        let services = services(transit);

        let outcome = runner(&services).run(&config()).await.unwrap();

        assert_eq!(outcome, SessionOutcome::ServiceSuspended);
        assert!(services.sink.delivered().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_skips_exhaust_distance() {
        let transit = FakeTransit::standard().with_script(
            "100",
            vec![snapshot(&[(12, -3)]), snapshot(&[(13, -2)]), snapshot(&[(14, -3)])],
        );
        let services = services(transit);

        let outcome = runner(&services).run(&config()).await.unwrap();

        assert_eq!(outcome, SessionOutcome::DistanceExhausted);
        assert!(services.sink.delivered().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_line_fails_fast() {
        let services = services(FakeTransit::standard());
        let mut config = config();
        config.line_id = "999".into();

        let err = runner(&services).run(&config).await.unwrap_err();

        assert!(matches!(err, SessionError::RouteNotFound { ref line } if line == "999"));
        assert_eq!(services.feed.polls("100"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_stop_fails_fast() {
        let services = services(FakeTransit::standard());
        let mut config = config();
        config.direction = Direction::Outbound;

        let err = runner(&services).run(&config).await.unwrap_err();

        assert!(matches!(err, SessionError::StopNotFound { .. }));
        assert!(err.to_string().contains("outbound"));
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_failure_ends_session() {
        let services = services(FakeTransit::standard().failing_registry());

        let err = runner(&services).run(&config()).await.unwrap_err();

        assert!(matches!(err, SessionError::Lookup(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_config_is_rejected() {
        let services = services(FakeTransit::standard());
        let mut config = config();
        config.time_threshold = 0;

        let err = runner(&services).run(&config).await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidConfig(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_waiting_session() {
        // Vehicle never gets close, so only cancellation can end the session.
        let transit = FakeTransit::standard().with_script("100", vec![snapshot(&[(12, 900)])]);
        let services = services(transit);
        let handle = CancelHandle::new();
        let runner =
            SessionRunner::new(services.clone(), MonitorSettings::default(), handle.token());

        let task = tokio::spawn(async move { runner.run(&config()).await });
        tokio::time::sleep(Duration::from_secs(150)).await;
        handle.cancel();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert_eq!(services.feed.polls("100"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_slow_stop_lookup() {
        let transit = FakeTransit::standard().slow_registry(Duration::from_secs(600));
        let services = services(transit);
        let handle = CancelHandle::new();
        let runner =
            SessionRunner::new(services.clone(), MonitorSettings::default(), handle.token());

        let start = tokio::time::Instant::now();
        let task = tokio::spawn(async move { runner.run(&config()).await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(services.feed.polls("100"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_stalled_feed() {
        let transit = FakeTransit::standard().with_script("100", vec![Script::Stall]);
        let services = services(transit);
        let handle = CancelHandle::new();
        let runner =
            SessionRunner::new(services.clone(), MonitorSettings::default(), handle.token());

        let start = tokio::time::Instant::now();
        let task = tokio::spawn(async move { runner.run(&config()).await });
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.cancel();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(6));
        assert_eq!(services.feed.polls("100"), 1);
    }

    #[tokio::test]
    async fn cancelled_before_start_never_polls() {
        let services = services(FakeTransit::standard());
        let handle = CancelHandle::new();
        handle.cancel();
        assert!(handle.is_cancelled());

        let runner =
            SessionRunner::new(services.clone(), MonitorSettings::default(), handle.token());
        let outcome = runner.run(&config()).await.unwrap();

        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert_eq!(services.feed.polls("100"), 0);
    }
}
