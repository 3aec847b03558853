//! Wire types for the KakaoMap `bus/stop.json` endpoint.
//!
//! Only the fields we read are modelled; everything else is ignored. The
//! endpoint is undocumented, so every field is optional. Missing and null
//! arrival times both mean "no estimate".

use serde::Deserialize;

/// Top-level stop response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopResponse {
    /// Stop display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Routes serving the stop. `None` when the key is absent or null.
    #[serde(default)]
    pub lines: Option<Vec<Line>>,
}

/// One route serving the stop.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    /// Route name (e.g. "126").
    #[serde(default)]
    pub name: Option<String>,

    /// Realtime arrival information.
    #[serde(default)]
    pub arrival: Option<Arrival>,

    /// Some responses carry the realtime state on the line itself.
    #[serde(default)]
    pub realtime_state: Option<String>,
}

/// Realtime arrival information for a route.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    #[serde(default)]
    pub direction: Option<String>,

    /// Seconds until the next bus.
    #[serde(default)]
    pub arrival_time: Option<i64>,

    /// Seconds until the bus after next.
    #[serde(default, rename = "arrivalTime2")]
    pub arrival_time_2: Option<i64>,

    #[serde(default)]
    pub realtime_state: Option<String>,

    #[serde(default)]
    pub vehicle_type: Option<String>,
}
