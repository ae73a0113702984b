//! Route, stop and direction identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid direction flag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction {value:?}: expected \"0\" (outbound) or \"1\" (inbound)")]
pub struct InvalidDirection {
    value: String,
}

/// Opaque route identifier, as assigned by the transit operator.
///
/// The static line table stores these either as strings or as bare
/// integers; both normalise to the same textual form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Create a route id from its textual form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the route id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric form used by the live feed and the stop registry.
    pub fn as_numeric(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }

    /// Whether a numeric route id from the live feed refers to this route.
    pub fn matches_numeric(&self, id: i64) -> bool {
        self.as_numeric() == Some(id)
    }
}

impl From<i64> for RouteId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric stop identifier shared by the stop registry and the live feed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub u32);

impl StopId {
    /// The stop whose identifier is `n` below this one, if it exists.
    pub fn offset_back(self, n: u32) -> Option<StopId> {
        self.0.checked_sub(n).map(StopId)
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Traversal direction of a route.
///
/// Upstream datasets encode this as `"0"` / `"1"` (sometimes as a bare
/// integer), so deserialisation accepts either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDirection", into = "String")]
pub enum Direction {
    /// Flag `0`.
    Outbound,
    /// Flag `1`.
    Inbound,
}

impl Direction {
    /// Parse a direction flag.
    pub fn parse(s: &str) -> Result<Self, InvalidDirection> {
        match s.trim() {
            "0" => Ok(Direction::Outbound),
            "1" => Ok(Direction::Inbound),
            other => Err(InvalidDirection {
                value: other.to_string(),
            }),
        }
    }

    /// The upstream flag for this direction.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Direction::Outbound => "0",
            Direction::Inbound => "1",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outbound => f.write_str("outbound"),
            Direction::Inbound => f.write_str("inbound"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDirection {
    Text(String),
    Number(i64),
}

impl TryFrom<RawDirection> for Direction {
    type Error = InvalidDirection;

    fn try_from(raw: RawDirection) -> Result<Self, Self::Error> {
        match raw {
            RawDirection::Text(s) => Direction::parse(&s),
            RawDirection::Number(n) => Direction::parse(&n.to_string()),
        }
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.as_flag().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_id_matches_numeric() {
        let route = RouteId::new("16111");
        assert!(route.matches_numeric(16111));
        assert!(!route.matches_numeric(16112));

        let named = RouteId::new("not-a-number");
        assert!(!named.matches_numeric(0));
        assert_eq!(named.as_numeric(), None);
        assert_eq!(RouteId::new(" 16111 ").as_numeric(), Some(16111));
    }

    #[test]
    fn route_id_from_integer() {
        assert_eq!(RouteId::from(10723), RouteId::new("10723"));
        assert_eq!(format!("{:?}", RouteId::new("42")), "RouteId(42)");
    }

    #[test]
    fn stop_id_offset_back() {
        assert_eq!(StopId(14).offset_back(2), Some(StopId(12)));
        assert_eq!(StopId(14).offset_back(0), Some(StopId(14)));
        assert_eq!(StopId(1).offset_back(2), None);
    }

    #[test]
    fn parse_direction() {
        assert_eq!(Direction::parse("0"), Ok(Direction::Outbound));
        assert_eq!(Direction::parse("1"), Ok(Direction::Inbound));
        assert_eq!(Direction::parse(" 1 "), Ok(Direction::Inbound));
        assert!(Direction::parse("2").is_err());
        assert!(Direction::parse("").is_err());
    }

    #[test]
    fn direction_deserializes_from_string_or_number() {
        let d: Direction = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(d, Direction::Inbound);

        let d: Direction = serde_json::from_str("0").unwrap();
        assert_eq!(d, Direction::Outbound);

        assert!(serde_json::from_str::<Direction>("\"x\"").is_err());
    }

    #[test]
    fn direction_serializes_as_flag() {
        assert_eq!(serde_json::to_string(&Direction::Inbound).unwrap(), "\"1\"");
    }
}
