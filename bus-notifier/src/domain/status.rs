//! Arrival status codes reported by the live estimate feed.
//!
//! The feed reports a single integer per stop. Positive values are a
//! countdown in seconds; a handful of negative values are status codes.

use std::fmt;

/// Semantic interpretation of a raw estimated-time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalStatus {
    /// Vehicle expected in this many seconds.
    Countdown(u64),
    /// `-1`: no vehicle has left the depot yet.
    NotYetDeparted,
    /// `-2`: vehicle will not call here because of traffic control.
    TrafficControlSkip,
    /// `-3`: the last trip of the day has already passed.
    LastTripPassed,
    /// `-4`: the route is not operating today.
    ServiceSuspendedToday,
    /// Any other non-positive value.
    Unknown(i64),
}

impl ArrivalStatus {
    /// Classify a raw estimated-time value.
    pub fn interpret(raw: i64) -> Self {
        match raw {
            t if t > 0 => ArrivalStatus::Countdown(t as u64),
            -1 => ArrivalStatus::NotYetDeparted,
            -2 => ArrivalStatus::TrafficControlSkip,
            -3 => ArrivalStatus::LastTripPassed,
            -4 => ArrivalStatus::ServiceSuspendedToday,
            other => ArrivalStatus::Unknown(other),
        }
    }

    /// Whether the vehicle will not serve the watched stop, so the next
    /// closer stop should be watched instead.
    pub fn skips_stop(&self) -> bool {
        matches!(
            self,
            ArrivalStatus::TrafficControlSkip | ArrivalStatus::LastTripPassed
        )
    }
}

impl fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrivalStatus::Countdown(secs) => write!(f, "arriving in {secs}s"),
            ArrivalStatus::NotYetDeparted => f.write_str("not yet departed"),
            ArrivalStatus::TrafficControlSkip => f.write_str("not stopping (traffic control)"),
            ArrivalStatus::LastTripPassed => f.write_str("last trip has passed"),
            ArrivalStatus::ServiceSuspendedToday => f.write_str("not in service today"),
            ArrivalStatus::Unknown(raw) => write!(f, "unknown status {raw}"),
        }
    }
}
