//! Live estimate feed client.
//!
//! This module provides an HTTP client for the operator's estimated
//! arrival feed, which lists, for every stop on every route, the number of
//! seconds until the next vehicle arrives.
//!
//! Key characteristics of the feed:
//! - A single gzip file covers the whole city, so per-route snapshots are
//!   built by filtering after download
//! - Negative estimates are status codes rather than times (see
//!   [`ArrivalStatus`](crate::domain::ArrivalStatus))
//! - Numeric columns may be encoded as JSON strings

mod client;
mod decode;
mod error;
mod types;

pub(crate) use client::download;
pub use client::{DEFAULT_ESTIMATE_URL, EstimateSource, FeedClient, FeedClientConfig};
pub use decode::{decode_bus_info, snapshot_for_route};
pub use error::FeedError;
pub use types::{EstimateRecord, StopRecord};
