//! Per-session notification state machine.
//!
//! Each tick consumes one live snapshot and decides whether to notify the
//! rider, keep waiting, or give up. The machine owns the only mutable
//! session state: the current notify distance and the terminal flag.
//!
//! Two invariants hold for the lifetime of a session:
//! - `notify_distance` never increases and never drops below -1; it only
//!   reaches -1 on the tick that terminates the session
//! - once terminated, a session never notifies or changes distance again

use tracing::{debug, info};

use crate::domain::{ArrivalSnapshot, ArrivalStatus, StopId};

use super::index::StopDistanceIndex;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The rider was notified.
    Notified,
    /// Every candidate stop was skipped or missing.
    DistanceExhausted,
    /// The route is not operating today.
    ServiceSuspended,
    /// Stopped from outside before reaching a decision.
    Cancelled,
}

/// What the vehicle was doing when the rider was notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approach {
    /// The stop that was being watched.
    pub stop: StopId,
    /// Stops between the watched stop and the target.
    pub distance: u32,
    /// Reported countdown at the watched stop.
    pub estimate_secs: u64,
}

/// Decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Deliver a notification. The session is terminated afterwards.
    Notify(Approach),
    /// Poll again after the interval.
    Continue,
    /// The session is over; see [`SessionStateMachine::outcome`].
    Terminate,
}

/// Mutable state of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    notify_distance: i64,
    outcome: Option<SessionOutcome>,
}

impl SessionState {
    fn new(notify_distance: u32) -> Self {
        Self {
            notify_distance: i64::from(notify_distance),
            outcome: None,
        }
    }

    pub fn notify_distance(&self) -> i64 {
        self.notify_distance
    }

    pub fn is_terminated(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Decides, one snapshot at a time, when to notify a rider.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    index: StopDistanceIndex,
    time_threshold: u64,
    state: SessionState,
}

impl SessionStateMachine {
    pub fn new(index: StopDistanceIndex, notify_distance: u32, time_threshold: u64) -> Self {
        Self {
            index,
            time_threshold,
            state: SessionState::new(notify_distance),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn notify_distance(&self) -> i64 {
        self.state.notify_distance
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    /// Why the session ended, once it has.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.state.outcome
    }

    /// The stop currently being watched, without mutating state.
    pub fn watched_stop(&self) -> Option<StopId> {
        if self.is_terminated() {
            return None;
        }
        self.index.watched_stop(self.current_distance())
    }

    /// Advance the session by one snapshot.
    pub fn tick(&mut self, snapshot: &ArrivalSnapshot) -> TickOutcome {
        if self.is_terminated() {
            return TickOutcome::Terminate;
        }

        // Move closer to the target until the route has a stop at this
        // distance. Bounded by notify_distance + 1 iterations.
        let mut moved_this_tick = false;
        let watched = loop {
            if let Some(stop) = self.index.watched_stop(self.current_distance()) {
                break stop;
            }
            moved_this_tick = true;
            if self.step_closer() {
                return TickOutcome::Terminate;
            }
        };

        let Some(raw) = snapshot.get(watched) else {
            debug!(stop = %watched, "no vehicle reporting at watched stop");
            return TickOutcome::Continue;
        };

        let status = ArrivalStatus::interpret(raw);
        match status {
            ArrivalStatus::Countdown(secs) if secs < self.time_threshold => {
                let approach = Approach {
                    stop: watched,
                    distance: self.current_distance(),
                    estimate_secs: secs,
                };
                self.finish(SessionOutcome::Notified);
                TickOutcome::Notify(approach)
            }
            ArrivalStatus::Countdown(secs) => {
                debug!(stop = %watched, secs, "please wait");
                TickOutcome::Continue
            }
            ArrivalStatus::TrafficControlSkip | ArrivalStatus::LastTripPassed => {
                info!(stop = %watched, %status, "watched stop will be skipped");
                // A skip event moves the watch at most one stop per tick.
                if !moved_this_tick && self.step_closer() {
                    return TickOutcome::Terminate;
                }
                TickOutcome::Continue
            }
            ArrivalStatus::NotYetDeparted => {
                info!(stop = %watched, %status, "waiting for first departure");
                TickOutcome::Continue
            }
            ArrivalStatus::ServiceSuspendedToday => {
                info!(stop = %watched, %status, "ending session");
                self.finish(SessionOutcome::ServiceSuspended);
                TickOutcome::Terminate
            }
            ArrivalStatus::Unknown(raw) => {
                debug!(stop = %watched, raw, "ignoring unknown status");
                TickOutcome::Continue
            }
        }
    }

    /// Current distance; only called while not terminated, so never negative.
    fn current_distance(&self) -> u32 {
        self.state.notify_distance.max(0) as u32
    }

    /// Watch the next stop closer to the target. Returns `true` if there is
    /// none left and the session has ended.
    fn step_closer(&mut self) -> bool {
        self.state.notify_distance -= 1;
        if self.state.notify_distance < 0 {
            info!("no candidate stops left");
            self.finish(SessionOutcome::DistanceExhausted);
            return true;
        }
        debug!(distance = self.state.notify_distance, "watching closer stop");
        false
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.state.outcome = Some(outcome);
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod machine_tests;
