//! Per-route arrival snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::consts::NO_VEHICLE;

/// Latest arrival data for every route at a stop, keyed by route name.
pub type RouteMap = BTreeMap<String, RouteSnapshot>;

/// Arrival data for one route, as of the last successful poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSnapshot {
    /// Route name (e.g. "126").
    pub route_id: String,

    /// Upstream realtime state; `NOVEHICLE` means nothing is tracked.
    pub realtime_state: String,

    /// Seconds until the next bus. Zero means no estimate.
    pub next_arrival_secs: i64,

    /// Seconds until the bus after that. Zero means no estimate.
    pub following_arrival_secs: i64,

    /// Heading of the route from this stop (e.g. "Sujeong").
    pub direction: Option<String>,

    /// Upstream vehicle type code.
    pub vehicle_type: Option<String>,
}

impl RouteSnapshot {
    /// Whether a vehicle with a usable estimate is tracked.
    pub fn has_vehicle(&self) -> bool {
        self.realtime_state != NO_VEHICLE && self.next_arrival_secs != 0
    }

    /// Minutes until the next bus, or `None` when there is no estimate.
    pub fn next_arrival_mins(&self) -> Option<i64> {
        self.has_vehicle()
            .then(|| seconds_to_minutes(self.next_arrival_secs))
    }

    /// Minutes until the bus after next, or `None` when there is no estimate.
    pub fn following_arrival_mins(&self) -> Option<i64> {
        (self.following_arrival_secs > 0).then(|| seconds_to_minutes(self.following_arrival_secs))
    }
}

/// Convert seconds to whole minutes, rounding half to even.
///
/// ```
/// use kakaobus_server::domain::seconds_to_minutes;
///
/// assert_eq!(seconds_to_minutes(300), 5);
/// assert_eq!(seconds_to_minutes(89), 1);
/// assert_eq!(seconds_to_minutes(90), 2);
/// assert_eq!(seconds_to_minutes(150), 2);
/// ```
pub fn seconds_to_minutes(secs: i64) -> i64 {
    (secs as f64 / 60.0).round_ties_even() as i64
}
