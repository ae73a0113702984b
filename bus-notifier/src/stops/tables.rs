//! Static route lookup tables.
//!
//! Two JSON files ship alongside the binary:
//! - `Line_to_Route.json` maps the public line name (`"672"`, `"重慶幹線"`)
//!   to the operator's route id, stored as a string or a bare integer
//! - `Route_to_Stop.json` maps a route id to its stop ids in travel order

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::domain::{RouteId, StopId, StopSequence};
use crate::monitor::{RouteLookup, StopSequenceSource};

use super::error::LookupError;

/// In-memory copy of both static tables.
#[derive(Debug, Clone, Default)]
pub struct RouteTables {
    line_to_route: HashMap<String, RouteId>,
    route_to_stops: HashMap<String, StopSequence>,
}

impl RouteTables {
    /// Build tables from already-parsed maps.
    pub fn new(
        line_to_route: HashMap<String, RouteId>,
        route_to_stops: HashMap<RouteId, StopSequence>,
    ) -> Self {
        Self {
            line_to_route,
            route_to_stops: route_to_stops
                .into_iter()
                .map(|(route, stops)| (route.as_str().to_string(), stops))
                .collect(),
        }
    }

    /// Read both tables from disk.
    pub async fn load(
        line_to_route_path: impl AsRef<Path>,
        route_to_stop_path: impl AsRef<Path>,
    ) -> Result<Self, LookupError> {
        let lines: HashMap<String, Value> = read_json(line_to_route_path.as_ref()).await?;
        let routes: HashMap<String, Vec<u32>> = read_json(route_to_stop_path.as_ref()).await?;

        let line_to_route = lines
            .into_iter()
            .filter_map(|(line, value)| route_id_from_value(&value).map(|route| (line, route)))
            .collect();

        let route_to_stops = routes
            .into_iter()
            .map(|(route, stops)| (route, stops.into_iter().map(StopId).collect()))
            .collect();

        Ok(Self {
            line_to_route,
            route_to_stops,
        })
    }

    pub fn route_for_line(&self, line: &str) -> Option<&RouteId> {
        self.line_to_route.get(line)
    }

    /// Stops for a route; empty if the route is unknown.
    pub fn stops_for_route(&self, route: &RouteId) -> StopSequence {
        self.route_to_stops
            .get(route.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Number of lines known to the line table.
    pub fn line_count(&self) -> usize {
        self.line_to_route.len()
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LookupError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LookupError::Io {
            path: path.display().to_string(),
            source,
        })?;

    serde_json::from_str(&contents).map_err(|e| LookupError::Json {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Route ids appear as `"16111"` or `16111`; empty strings mean "no route".
fn route_id_from_value(value: &Value) -> Option<RouteId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(RouteId::new(s.trim())),
        Value::Number(n) => n.as_i64().map(RouteId::from),
        _ => None,
    }
}

impl RouteLookup for RouteTables {
    async fn resolve_route(&self, line: &str) -> Result<Option<RouteId>, LookupError> {
        Ok(self.route_for_line(line).cloned())
    }
}

impl StopSequenceSource for RouteTables {
    async fn stop_sequence(&self, route: &RouteId) -> Result<StopSequence, LookupError> {
        Ok(self.stops_for_route(route))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use tempfile::tempdir;

    async fn write_tables(dir: &Path, lines: &str, routes: &str) -> (PathBuf, PathBuf) {
        let line_path = dir.join("Line_to_Route.json");
        let route_path = dir.join("Route_to_Stop.json");
        tokio::fs::write(&line_path, lines).await.unwrap();
        tokio::fs::write(&route_path, routes).await.unwrap();
        (line_path, route_path)
    }

    #[tokio::test]
    async fn load_tables_from_disk() {
        let dir = tempdir().unwrap();
        let (lines, routes) = write_tables(
            dir.path(),
            r#"{"672": "16111", "615": 10723, "dead": ""}"#,
            r#"{"16111": [38010, 38011, 38012], "10723": []}"#,
        )
        .await;

        let tables = RouteTables::load(&lines, &routes).await.unwrap();

        assert_eq!(tables.line_count(), 2);
        assert_eq!(tables.route_for_line("672"), Some(&RouteId::new("16111")));
        assert_eq!(tables.route_for_line("615"), Some(&RouteId::new("10723")));
        assert_eq!(tables.route_for_line("dead"), None);

        let seq = tables.stops_for_route(&RouteId::new("16111"));
        assert_eq!(seq.as_slice(), &[StopId(38010), StopId(38011), StopId(38012)]);
        assert!(tables.stops_for_route(&RouteId::new("99999")).is_empty());
    }

    #[tokio::test]
    async fn lookup_traits() {
        let tables = RouteTables::new(
            HashMap::from([("672".to_string(), RouteId::new("16111"))]),
            HashMap::from([(RouteId::new("16111"), StopSequence::new(vec![StopId(1)]))]),
        );

        let route = tables.resolve_route("672").await.unwrap();
        assert_eq!(route, Some(RouteId::new("16111")));
        assert_eq!(tables.resolve_route("000").await.unwrap(), None);

        let seq = tables.stop_sequence(&RouteId::new("16111")).await.unwrap();
        assert_eq!(seq.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = RouteTables::load(dir.path().join("a.json"), dir.path().join("b.json")).await;
        assert!(matches!(result, Err(LookupError::Io { .. })));
    }

    #[tokio::test]
    async fn malformed_file_is_json_error() {
        let dir = tempdir().unwrap();
        let (lines, routes) = write_tables(dir.path(), "[1, 2]", "{}").await;
        let result = RouteTables::load(&lines, &routes).await;
        assert!(matches!(result, Err(LookupError::Json { .. })));
    }
}
