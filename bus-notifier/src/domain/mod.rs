//! Domain types for the arrival notifier.
//!
//! Identifiers, stop sequences, live snapshots and the status codes the
//! estimate feed uses. Nothing in here performs I/O.

mod ids;
mod sequence;
mod snapshot;
mod status;

pub use ids::{Direction, InvalidDirection, RouteId, StopId};
pub use sequence::StopSequence;
pub use snapshot::ArrivalSnapshot;
pub use status::ArrivalStatus;
