//! KakaoMap bus client.
//!
//! KakaoMap serves realtime arrivals for a stop from an undocumented JSON
//! endpoint, `bus/stop.json?busstopid={id}`:
//! - Routes are identified by their display name (e.g. "126"), not by a
//!   stable numeric id
//! - Arrival times are seconds from now; 0 means no estimate
//! - `realtimeState == "NOVEHICLE"` marks routes with nothing tracked

mod client;
mod convert;
mod error;
mod lookup;
mod types;

pub use client::{DEFAULT_BASE_URL, KakaoClient, KakaoConfig};
pub use convert::{StopInfo, route_map, stop_info};
pub use error::KakaoError;
pub use lookup::lookup_stop;
pub use types::{Arrival, Line, StopResponse};
