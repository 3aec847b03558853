//! Integration-wide constants: option keys, defaults and bounds.

/// Integration domain name.
pub const DOMAIN: &str = "kakaomap_bus";

pub const CONF_STOP_ID: &str = "stop_id";
pub const CONF_STOP_NAME: &str = "stop_name";
pub const CONF_BUSES: &str = "buses";
pub const CONF_QUIET_START: &str = "quiet_start";
pub const CONF_QUIET_END: &str = "quiet_end";
pub const CONF_SCAN_INTERVAL: &str = "scan_interval";

/// Default start of the quiet-hours window.
pub const DEFAULT_QUIET_START: &str = "00:00:00";

/// Default end of the quiet-hours window.
pub const DEFAULT_QUIET_END: &str = "05:00:00";

/// Default poll interval in seconds.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 90;

/// Shortest poll interval a user may configure.
pub const MIN_SCAN_INTERVAL_SECS: u64 = 30;

/// Longest poll interval a user may configure.
pub const MAX_SCAN_INTERVAL_SECS: u64 = 600;

/// Upstream realtime state meaning no vehicle is tracked on the route.
pub const NO_VEHICLE: &str = "NOVEHICLE";

/// Unit of measurement published by route sensors.
pub const UNIT_MINUTES: &str = "min";

/// Icon published by route sensors.
pub const SENSOR_ICON: &str = "mdi:bus-clock";
