//! Route and stop lookup data.
//!
//! Static line/route tables read from disk, plus the operator's stop
//! registry, fetched over HTTP on first use and cached on disk.

mod cache;
mod client;
mod directory;
mod error;
mod registry;
mod tables;

pub use cache::StopCache;
pub use client::{DEFAULT_STOP_URL, StopClient, StopClientConfig};
pub use directory::StopDirectory;
pub use error::LookupError;
pub use registry::{RegisteredStop, RegistryIndex};
pub use tables::RouteTables;
