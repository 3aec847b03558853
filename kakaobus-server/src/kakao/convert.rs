//! Conversion from KakaoMap wire types to domain types.

use tracing::warn;

use crate::domain::{RouteCatalog, RouteCatalogEntry, RouteMap, RouteSnapshot, StopId};

use super::types::{Line, StopResponse};

/// Stop name and selectable routes, as shown during configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopInfo {
    pub stop_name: String,
    pub catalog: RouteCatalog,
}

/// Route name of a line, if it has a usable one.
fn route_name(line: &Line) -> Option<&str> {
    line.name.as_deref().filter(|n| !n.is_empty())
}

/// Build the per-route snapshot map from a `lines` array.
///
/// Lines without a name are skipped. Route names are expected to be unique
/// within a stop; if one repeats, the last line wins.
pub fn route_map(lines: &[Line]) -> RouteMap {
    let mut routes = RouteMap::new();

    for line in lines {
        let Some(name) = route_name(line) else {
            continue;
        };

        let snapshot = route_snapshot(name, line);
        if routes.insert(name.to_string(), snapshot).is_some() {
            warn!(route = name, "Duplicate route name in stop response, keeping the last one");
        }
    }

    routes
}

fn route_snapshot(name: &str, line: &Line) -> RouteSnapshot {
    let arrival = line.arrival.clone().unwrap_or_default();

    let realtime_state = arrival
        .realtime_state
        .or_else(|| line.realtime_state.clone())
        .unwrap_or_default();

    RouteSnapshot {
        route_id: name.to_string(),
        realtime_state,
        next_arrival_secs: arrival.arrival_time.unwrap_or(0),
        following_arrival_secs: arrival.arrival_time_2.unwrap_or(0),
        direction: arrival.direction,
        vehicle_type: arrival.vehicle_type,
    }
}

/// Extract the stop name and route catalog from a stop response.
///
/// Returns `None` when the response has no `lines` or none of them is
/// named: such a stop has nothing to select. The stop name falls back to the
/// stop id.
pub fn stop_info(response: &StopResponse, stop_id: &StopId) -> Option<StopInfo> {
    let lines = response.lines.as_ref()?;

    let catalog: RouteCatalog = lines
        .iter()
        .filter_map(|line| {
            let name = route_name(line)?;
            let direction = line.arrival.as_ref().and_then(|a| a.direction.as_deref());
            Some(RouteCatalogEntry::new(name, direction))
        })
        .collect();

    if catalog.is_empty() {
        return None;
    }

    let stop_name = response
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| stop_id.to_string());

    Some(StopInfo { stop_name, catalog })
}
