//! Wire types for the gzip JSON datasets published by the operator.
//!
//! Both the estimate feed and the stop registry wrap their rows in a
//! top-level `BusInfo` array. Numeric columns are not consistently typed:
//! the same field can arrive as `120` or `"120"` depending on the export.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Direction, StopId};

/// Envelope shared by every dataset.
#[derive(Debug, Deserialize)]
pub struct BusInfoEnvelope<T> {
    #[serde(rename = "BusInfo")]
    pub bus_info: Vec<T>,
}

/// One row of `GetEstimateTime.gz`.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRecord {
    #[serde(rename = "RouteID", deserialize_with = "int_or_string")]
    pub route_id: i64,

    #[serde(rename = "StopID", deserialize_with = "stop_id")]
    pub stop_id: StopId,

    /// Seconds until arrival, or a negative status code.
    #[serde(rename = "EstimateTime", deserialize_with = "int_or_string")]
    pub estimate_time: i64,
}

/// One row of `GetStop.gz`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StopRecord {
    #[serde(rename = "Id", deserialize_with = "stop_id")]
    pub id: StopId,

    #[serde(rename = "routeId", deserialize_with = "int_or_string")]
    pub route_id: i64,

    #[serde(rename = "nameZh")]
    pub name: String,

    #[serde(rename = "goBack")]
    pub direction: Direction,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Text(String),
}

fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn stop_id<'de, D>(deserializer: D) -> Result<StopId, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = int_or_string(deserializer)?;
    u32::try_from(raw)
        .map(StopId)
        .map_err(|_| serde::de::Error::custom(format!("stop id out of range: {raw}")))
}
