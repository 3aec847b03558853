//! Per-stop configuration record.
//!
//! A configured stop is stored in two halves: immutable identity
//! ([`StopData`]) written once by the config flow, and adjustable settings
//! ([`StopOptions`]) replaced as a whole by the options flow.

use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_QUIET_END, DEFAULT_QUIET_START, DEFAULT_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS,
    MIN_SCAN_INTERVAL_SECS,
};

use super::quiet::quiet_hours_active;
use super::stop::StopId;

/// Immutable identity of a configured stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopData {
    pub stop_id: StopId,
    pub stop_name: String,
}

/// User-adjustable settings of a configured stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopOptions {
    /// Selected route names, in the order the user picked them.
    #[serde(rename = "buses", default)]
    pub routes: Vec<String>,

    /// Start of the quiet-hours window (`HH:MM:SS` or `HH:MM`).
    #[serde(default = "default_quiet_start")]
    pub quiet_start: String,

    /// End of the quiet-hours window (`HH:MM:SS` or `HH:MM`).
    #[serde(default = "default_quiet_end")]
    pub quiet_end: String,

    /// Poll interval in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

fn default_quiet_start() -> String {
    DEFAULT_QUIET_START.to_string()
}

fn default_quiet_end() -> String {
    DEFAULT_QUIET_END.to_string()
}

const fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

impl StopOptions {
    /// Options with the given routes and default quiet hours and interval.
    pub fn with_routes(routes: Vec<String>) -> Self {
        Self {
            routes,
            ..Self::default()
        }
    }

    /// The poll interval, clamped to the allowed range.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(clamp_scan_interval(self.scan_interval))
    }

    /// Whether polling should be suppressed at `now`.
    pub fn quiet_hours_active(&self, now: NaiveTime) -> bool {
        quiet_hours_active(now, &self.quiet_start, &self.quiet_end)
    }
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            quiet_start: default_quiet_start(),
            quiet_end: default_quiet_end(),
            scan_interval: DEFAULT_SCAN_INTERVAL_SECS,
        }
    }
}

/// Clamp a poll interval to the allowed 30-600 second range.
pub fn clamp_scan_interval(secs: u64) -> u64 {
    secs.clamp(MIN_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS)
}

/// Flattened view of a configured stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopConfiguration {
    pub stop_id: StopId,
    pub stop_name: String,
    pub selected_routes: Vec<String>,
    pub quiet_start: String,
    pub quiet_end: String,
    pub poll_interval_secs: u64,
}

impl StopConfiguration {
    pub fn new(data: &StopData, options: &StopOptions) -> Self {
        Self {
            stop_id: data.stop_id.clone(),
            stop_name: data.stop_name.clone(),
            selected_routes: options.routes.clone(),
            quiet_start: options.quiet_start.clone(),
            quiet_end: options.quiet_end.clone(),
            poll_interval_secs: clamp_scan_interval(options.scan_interval),
        }
    }
}
