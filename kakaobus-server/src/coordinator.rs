//! Per-stop polling coordinator.
//!
//! Each configured stop gets one coordinator. It polls the KakaoMap endpoint
//! on the configured interval and publishes the latest per-route snapshot
//! for sensors to read.
//!
//! Every tick takes one of two branches:
//! - **Suppressed**: quiet hours are active. No request is made and the
//!   published snapshot is left exactly as it was.
//! - **Active**: the stop is fetched and, on success, the snapshot is
//!   replaced wholesale. On failure the previous snapshot stays published
//!   and the failure is recorded; the next tick tries again.
//!
//! Interval and quiet hours are read from the config-entry store at every
//! tick, so option changes apply without a restart.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::domain::{RouteMap, RouteSnapshot, StopId, StopOptions};
use crate::host::{ConfigEntryStore, EntryId};
use crate::kakao::{KakaoClient, KakaoError, route_map};

/// A poll that failed; the previous snapshot is still published.
#[derive(Debug, thiserror::Error)]
#[error("error communicating with API for stop {stop_id}: {source}")]
pub struct UpdateFailed {
    pub stop_id: StopId,
    #[source]
    pub source: KakaoError,
}

/// What a successful tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Fetched and published a new snapshot with this many routes.
    Updated { routes: usize },
    /// Quiet hours were active; nothing was fetched.
    Skipped,
}

/// Published coordinator state.
#[derive(Debug, Default)]
struct CoordinatorState {
    /// Latest snapshot. `None` until the first successful tick.
    data: Option<Arc<RouteMap>>,
    last_update_success: bool,
    consecutive_failures: u32,
    last_error: Option<String>,
    last_updated: Option<DateTime<Local>>,
}

/// Point-in-time view of the coordinator's health.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorStatus {
    pub stop_id: StopId,
    pub last_update_success: bool,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
    pub routes: usize,
}

/// Polls one stop and publishes its route snapshot.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct BusDataCoordinator {
    client: KakaoClient,
    store: ConfigEntryStore,
    entry_id: EntryId,
    stop_id: StopId,
    state: Arc<RwLock<CoordinatorState>>,
    /// Held for the whole of a tick so ticks never overlap.
    tick_lock: Arc<Mutex<()>>,
}

impl BusDataCoordinator {
    /// Create a coordinator for a stored entry. Nothing is fetched yet.
    pub fn new(
        client: KakaoClient,
        store: ConfigEntryStore,
        entry_id: EntryId,
        stop_id: StopId,
    ) -> Self {
        Self {
            client,
            store,
            entry_id,
            stop_id,
            state: Arc::new(RwLock::new(CoordinatorState::default())),
            tick_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn stop_id(&self) -> &StopId {
        &self.stop_id
    }

    pub fn entry_id(&self) -> &EntryId {
        &self.entry_id
    }

    /// Run one tick now, using the local wall-clock time.
    pub async fn refresh(&self) -> Result<TickOutcome, UpdateFailed> {
        self.refresh_at(Local::now().time()).await
    }

    /// Run one tick as if the local time of day were `now`.
    ///
    /// Waits for any tick already in progress.
    pub async fn refresh_at(&self, now: NaiveTime) -> Result<TickOutcome, UpdateFailed> {
        let _tick = self.tick_lock.lock().await;

        let options = self.current_options().await;

        if options.quiet_hours_active(now) {
            debug!(stop_id = %self.stop_id, "Quiet hours active, skipping update");
            self.record_skip().await;
            return Ok(TickOutcome::Skipped);
        }

        match self.client.fetch_stop(&self.stop_id).await {
            Ok(response) => {
                let routes = match response.lines.as_deref() {
                    Some(lines) => route_map(lines),
                    None => {
                        warn!(stop_id = %self.stop_id, "Missing 'lines' key in API response");
                        RouteMap::new()
                    }
                };
                let count = routes.len();
                self.record_success(routes).await;
                Ok(TickOutcome::Updated { routes: count })
            }
            Err(source) => {
                let err = UpdateFailed {
                    stop_id: self.stop_id.clone(),
                    source,
                };
                self.record_failure(&err).await;
                Err(err)
            }
        }
    }

    /// Poll until the entry disappears from the store.
    ///
    /// The first tick happens one interval after the call; the registry runs
    /// the initial refresh itself before spawning this loop. The interval is
    /// re-read before every sleep.
    pub async fn run(self) {
        self.run_with(tokio::time::sleep).await;
    }

    /// The polling loop, waiting between ticks with `sleep`.
    pub(crate) async fn run_with<S, F>(self, mut sleep: S)
    where
        S: FnMut(Duration) -> F,
        F: Future<Output = ()>,
    {
        loop {
            let Some(options) = self.store.options(&self.entry_id).await else {
                break;
            };

            sleep(options.poll_interval()).await;

            // The entry may have been removed while we slept.
            if self.store.options(&self.entry_id).await.is_none() {
                break;
            }

            // Failures are logged by `record_failure` and retried next tick.
            let _ = self.refresh().await;
        }

        info!(stop_id = %self.stop_id, "Config entry removed, stopping updates");
    }

    /// Latest snapshot, or `None` before the first successful tick.
    pub async fn data(&self) -> Option<Arc<RouteMap>> {
        self.state.read().await.data.clone()
    }

    /// Snapshot for one route, if the latest poll listed it.
    pub async fn route(&self, route_id: &str) -> Option<RouteSnapshot> {
        let guard = self.state.read().await;
        guard.data.as_ref()?.get(route_id).cloned()
    }

    /// Whether the most recent tick succeeded.
    pub async fn last_update_success(&self) -> bool {
        self.state.read().await.last_update_success
    }

    /// Number of failed ticks since the last success.
    pub async fn failure_count(&self) -> u32 {
        self.state.read().await.consecutive_failures
    }

    pub async fn status(&self) -> CoordinatorStatus {
        let guard = self.state.read().await;
        CoordinatorStatus {
            stop_id: self.stop_id.clone(),
            last_update_success: guard.last_update_success,
            consecutive_failures: guard.consecutive_failures,
            last_error: guard.last_error.clone(),
            last_updated: guard.last_updated,
            routes: guard.data.as_ref().map_or(0, |d| d.len()),
        }
    }

    /// Options from the live entry, or defaults if it was just removed.
    async fn current_options(&self) -> StopOptions {
        self.store
            .options(&self.entry_id)
            .await
            .unwrap_or_default()
    }

    async fn record_skip(&self) {
        let mut guard = self.state.write().await;
        if guard.data.is_none() {
            guard.data = Some(Arc::new(RouteMap::new()));
        }
        self.mark_success(&mut guard);
    }

    async fn record_success(&self, routes: RouteMap) {
        let mut guard = self.state.write().await;
        debug!(stop_id = %self.stop_id, routes = routes.len(), "Fetched stop data");
        guard.data = Some(Arc::new(routes));
        guard.last_updated = Some(Local::now());
        self.mark_success(&mut guard);
    }

    fn mark_success(&self, state: &mut CoordinatorState) {
        if !state.last_update_success && state.consecutive_failures > 0 {
            info!(
                stop_id = %self.stop_id,
                failures = state.consecutive_failures,
                "Fetching stop data recovered"
            );
        }
        state.last_update_success = true;
        state.consecutive_failures = 0;
        state.last_error = None;
    }

    /// Record a failed tick. Only the first failure in a run is logged at
    /// warn level.
    async fn record_failure(&self, err: &UpdateFailed) {
        let mut guard = self.state.write().await;

        if guard.consecutive_failures == 0 {
            warn!(stop_id = %self.stop_id, error = %err.source, "Error fetching stop data");
        } else {
            debug!(
                stop_id = %self.stop_id,
                error = %err.source,
                failures = guard.consecutive_failures + 1,
                "Error fetching stop data"
            );
        }

        guard.last_update_success = false;
        guard.consecutive_failures += 1;
        guard.last_error = Some(err.to_string());
    }
}
