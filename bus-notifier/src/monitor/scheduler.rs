//! Runs every rider session concurrently.
//!
//! Each session gets its own task, so a session that fails, or even
//! panics, is reported on its own and never disturbs the others.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{Instrument, info_span};

use crate::notify::NotificationSink;

use super::config::{MonitorSettings, SessionConfig};
use super::machine::SessionOutcome;
use super::runner::{CancelHandle, Collaborators, SessionError, SessionRunner};
use super::sources::{ArrivalFeed, RouteLookup, StopRegistry, StopSequenceSource};

/// Final result of one session.
#[derive(Debug)]
pub struct SessionReport {
    /// Label of the session, see [`SessionConfig::label`].
    pub label: String,
    pub result: Result<SessionOutcome, SessionError>,
}

/// Owns the shared collaborators and launches one runner per session.
pub struct SessionScheduler<T, R, F, N> {
    services: Arc<Collaborators<T, R, F, N>>,
    settings: MonitorSettings,
    cancel: CancelHandle,
}

impl<T, R, F, N> SessionScheduler<T, R, F, N>
where
    T: RouteLookup + StopSequenceSource + 'static,
    R: StopRegistry + 'static,
    F: ArrivalFeed + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(services: Collaborators<T, R, F, N>, settings: MonitorSettings) -> Self {
        Self {
            services: Arc::new(services),
            settings,
            cancel: CancelHandle::new(),
        }
    }

    /// Handle that stops every running session at its next wait.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run all sessions to completion.
    ///
    /// Reports are returned in the same order as `configs`.
    pub async fn run_all(&self, configs: Vec<SessionConfig>) -> Vec<SessionReport> {
        let (labels, tasks): (Vec<_>, Vec<_>) = configs
            .into_iter()
            .map(|config| {
                let label = config.label();
                let span = info_span!("session", session = %label);
                let runner = SessionRunner::new(
                    self.services.clone(),
                    self.settings.clone(),
                    self.cancel.token(),
                );
                let task = tokio::spawn(async move { runner.run(&config).await }.instrument(span));
                (label, task)
            })
            .unzip();

        let joined = join_all(tasks).await;

        labels
            .into_iter()
            .zip(joined)
            .map(|(label, joined)| SessionReport {
                label,
                result: joined.unwrap_or_else(|e| Err(SessionError::Crashed(e.to_string()))),
            })
            .collect()
    }

    /// Access the shared collaborators.
    pub fn services(&self) -> &Collaborators<T, R, F, N> {
        &self.services
    }
}
