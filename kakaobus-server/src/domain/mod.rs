//! Domain types for the bus arrival integration.
//!
//! These types are independent of the upstream wire format and of the host
//! runtime. Parsing types validate at construction time.

mod config;
mod quiet;
mod route;
mod snapshot;
mod stop;

pub use config::{StopConfiguration, StopData, StopOptions, clamp_scan_interval};
pub use quiet::{QuietWindow, TimeOfDayError, parse_time_of_day, quiet_hours_active};
pub use route::{RouteCatalog, RouteCatalogEntry};
pub use snapshot::{RouteMap, RouteSnapshot, seconds_to_minutes};
pub use stop::{InvalidStopId, StopId};
