//! Arrival monitoring engine.
//!
//! This module implements the core loop that answers: "is the bus I'm
//! waiting for close enough that I should head to the stop?"
//!
//! Each rider session resolves its route and target stop once, then polls
//! the live feed on a fixed interval. A state machine watches the stop `N`
//! before the target and fires a single notification when the vehicle's
//! countdown there drops below the rider's threshold.

mod config;
#[cfg(test)]
mod fixtures;
mod index;
mod machine;
mod runner;
mod scheduler;
mod sources;

pub use config::{DEFAULT_POLL_INTERVAL, InvalidSessionConfig, MonitorSettings, SessionConfig};
pub use index::{DistanceMode, StopDistanceIndex};
pub use machine::{Approach, SessionOutcome, SessionState, SessionStateMachine, TickOutcome};
pub use runner::{CancelHandle, Cancellation, Collaborators, SessionError, SessionRunner};
pub use scheduler::{SessionReport, SessionScheduler};
pub use sources::{ArrivalFeed, RouteLookup, StopRegistry, StopSequenceSource};
