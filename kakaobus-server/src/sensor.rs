//! Per-route arrival sensors.
//!
//! A sensor is a read-only view over its stop's coordinator: it owns no
//! data and reads the latest snapshot on demand. A route missing from the
//! snapshot reads the same as a route with no vehicle.

use serde::Serialize;

use crate::consts::{SENSOR_ICON, UNIT_MINUTES};
use crate::coordinator::BusDataCoordinator;
use crate::domain::{RouteSnapshot, StopId};

/// Extra attributes published alongside the reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorAttributes {
    /// Minutes until the bus after next, if known.
    pub next_bus_min: Option<i64>,
    pub direction: Option<String>,
    pub stop_name: String,
    pub vehicle_type: Option<String>,
}

/// Everything a host UI needs to show one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    /// Minutes until the next bus; `None` means unknown.
    pub state: Option<i64>,
    pub unit_of_measurement: &'static str,
    pub icon: &'static str,
    /// False while the coordinator's last update failed.
    pub available: bool,
    pub attributes: SensorAttributes,
}

impl SensorState {
    /// Build the published state from a route snapshot.
    pub fn from_snapshot(
        stop_id: &StopId,
        stop_name: &str,
        route_id: &str,
        snapshot: Option<&RouteSnapshot>,
        available: bool,
    ) -> Self {
        Self {
            unique_id: unique_id(stop_id, route_id),
            name: route_id.to_string(),
            state: snapshot.and_then(RouteSnapshot::next_arrival_mins),
            unit_of_measurement: UNIT_MINUTES,
            icon: SENSOR_ICON,
            available,
            attributes: SensorAttributes {
                next_bus_min: snapshot.and_then(RouteSnapshot::following_arrival_mins),
                direction: snapshot.and_then(|s| s.direction.clone()),
                stop_name: stop_name.to_string(),
                vehicle_type: snapshot.and_then(|s| s.vehicle_type.clone()),
            },
        }
    }
}

/// Sensor unique id: `{stop_id}_{route}`.
pub fn unique_id(stop_id: &StopId, route_id: &str) -> String {
    format!("{stop_id}_{route_id}")
}

/// Arrival sensor for one route at one stop.
#[derive(Debug, Clone)]
pub struct RouteSensor {
    coordinator: BusDataCoordinator,
    stop_name: String,
    route_id: String,
}

impl RouteSensor {
    pub fn new(
        coordinator: BusDataCoordinator,
        stop_name: impl Into<String>,
        route_id: impl Into<String>,
    ) -> Self {
        Self {
            coordinator,
            stop_name: stop_name.into(),
            route_id: route_id.into(),
        }
    }

    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn unique_id(&self) -> String {
        unique_id(self.coordinator.stop_id(), &self.route_id)
    }

    /// Minutes until the next bus, or `None` when unknown.
    pub async fn native_value(&self) -> Option<i64> {
        self.coordinator
            .route(&self.route_id)
            .await
            .and_then(|s| s.next_arrival_mins())
    }

    pub async fn available(&self) -> bool {
        self.coordinator.last_update_success().await
    }

    /// Current published state.
    pub async fn state(&self) -> SensorState {
        let snapshot = self.coordinator.route(&self.route_id).await;
        let available = self.coordinator.last_update_success().await;
        SensorState::from_snapshot(
            self.coordinator.stop_id(),
            &self.stop_name,
            &self.route_id,
            snapshot.as_ref(),
            available,
        )
    }
}
