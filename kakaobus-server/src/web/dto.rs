//! Data transfer objects for web responses.

use serde::Serialize;

use crate::coordinator::{CoordinatorStatus, TickOutcome, UpdateFailed};
use crate::domain::StopConfiguration;
use crate::flow::FlowResult;
use crate::host::{ConfigEntry, EntryId};
use crate::sensor::SensorState;

/// A config entry in listings.
#[derive(Debug, Serialize)]
pub struct EntrySummary {
    pub entry_id: EntryId,
    pub title: String,
    pub configuration: StopConfiguration,
}

impl From<&ConfigEntry> for EntrySummary {
    fn from(entry: &ConfigEntry) -> Self {
        Self {
            entry_id: entry.entry_id.clone(),
            title: entry.title.clone(),
            configuration: entry.configuration(),
        }
    }
}

/// Response listing config entries.
#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<EntrySummary>,
}

/// Sensor states of one entry.
#[derive(Debug, Serialize)]
pub struct SensorsResponse {
    pub entry_id: EntryId,
    pub status: CoordinatorStatus,
    pub sensors: Vec<SensorState>,
}

/// Result of a forced refresh.
///
/// A failed fetch is not an HTTP error: the previous snapshot stays
/// published and `status.last_error` says what went wrong.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// "updated", "skipped" (quiet hours) or "failed"
    pub outcome: &'static str,
    /// Routes in the new snapshot, when one was fetched
    pub routes: Option<usize>,
    pub status: CoordinatorStatus,
}

impl RefreshResponse {
    pub fn new(outcome: Result<TickOutcome, UpdateFailed>, status: CoordinatorStatus) -> Self {
        let (outcome, routes) = match outcome {
            Ok(TickOutcome::Updated { routes }) => ("updated", Some(routes)),
            Ok(TickOutcome::Skipped) => ("skipped", None),
            Err(_) => ("failed", None),
        };
        Self {
            outcome,
            routes,
            status,
        }
    }
}

/// A flow step result, with the id to continue the flow under.
#[derive(Debug, Serialize)]
pub struct FlowResponse {
    /// Present while the flow expects another submission
    pub flow_id: Option<String>,
    #[serde(flatten)]
    pub result: FlowResult,
}

impl FlowResponse {
    /// A final or stateless result.
    pub fn done(result: FlowResult) -> Self {
        Self {
            flow_id: None,
            result,
        }
    }

    /// A result the client continues under `flow_id`.
    pub fn pending(flow_id: String, result: FlowResult) -> Self {
        Self {
            flow_id: Some(flow_id),
            result,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
