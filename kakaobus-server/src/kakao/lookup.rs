//! One-shot stop lookup used by the configuration flows.

use tracing::debug;

use crate::domain::StopId;

use super::client::KakaoClient;
use super::convert::{StopInfo, stop_info};

/// Look up a stop's name and route catalog.
///
/// Every failure (transport, status, JSON, no routes) collapses to `None`;
/// the flows only need to know whether the stop is usable. The reason is
/// logged at debug level.
pub async fn lookup_stop(client: &KakaoClient, stop_id: &StopId) -> Option<StopInfo> {
    match client.fetch_stop(stop_id).await {
        Ok(response) => {
            let info = stop_info(&response, stop_id);
            if info.is_none() {
                debug!(stop_id = %stop_id, "Stop response has no routes");
            }
            info
        }
        Err(e) => {
            debug!(stop_id = %stop_id, error = %e, "Stop lookup failed");
            None
        }
    }
}
