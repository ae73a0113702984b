//! Decoding of gzip JSON payloads into domain types.

use std::io::Read;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use crate::domain::{ArrivalSnapshot, RouteId};

use super::error::FeedError;
use super::types::{BusInfoEnvelope, EstimateRecord};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decompress (if gzip) and parse a `BusInfo` dataset.
///
/// Some mirrors serve the file with `Content-Encoding: gzip`, in which case
/// the HTTP layer has already inflated it; plain JSON is accepted as-is.
pub fn decode_bus_info<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, FeedError> {
    let json = if bytes.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::with_capacity(bytes.len() * 8);
        GzDecoder::new(bytes)
            .read_to_end(&mut inflated)
            .map_err(FeedError::Decompress)?;
        inflated
    } else {
        bytes.to_vec()
    };

    let envelope: BusInfoEnvelope<T> =
        serde_json::from_slice(&json).map_err(|e| FeedError::Json {
            message: e.to_string(),
            body: Some(String::from_utf8_lossy(&json).chars().take(500).collect()),
        })?;

    Ok(envelope.bus_info)
}

/// Filter the city-wide estimate table down to one route.
pub fn snapshot_for_route(records: &[EstimateRecord], route: &RouteId) -> ArrivalSnapshot {
    ArrivalSnapshot::from_records(
        records
            .iter()
            .filter(|r| route.matches_numeric(r.route_id))
            .map(|r| (r.stop_id, r.estimate_time)),
    )
}
