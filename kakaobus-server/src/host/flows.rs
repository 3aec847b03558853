//! Pending flow sessions.
//!
//! Between two steps of a flow the host keeps the step's draft under a flow
//! id. Abandoned flows expire on their own.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::flow::{OptionsDraft, StopDraft};

/// How long an untouched flow stays resumable.
const DEFAULT_FLOW_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on concurrently pending flows.
const MAX_PENDING_FLOWS: u64 = 256;

/// A flow waiting for its next submission.
#[derive(Debug, Clone)]
pub enum PendingFlow {
    /// Setup flow waiting for route selection.
    Config(StopDraft),
    /// Options flow waiting for submission.
    Options(OptionsDraft),
}

/// Store of pending flows, keyed by flow id.
pub struct FlowSessions {
    pending: MokaCache<String, PendingFlow>,
    next_id: AtomicU64,
}

impl FlowSessions {
    pub fn new(ttl: Duration) -> Self {
        let pending = MokaCache::builder()
            .time_to_idle(ttl)
            .max_capacity(MAX_PENDING_FLOWS)
            .build();

        Self {
            pending,
            next_id: AtomicU64::new(1),
        }
    }

    /// Park a new flow and return its id.
    pub async fn start(&self, flow: PendingFlow) -> String {
        let flow_id = format!("{:016x}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.pending.insert(flow_id.clone(), flow).await;
        flow_id
    }

    /// Park a flow again under its existing id, e.g. after a form error.
    pub async fn resume(&self, flow_id: &str, flow: PendingFlow) {
        self.pending.insert(flow_id.to_string(), flow).await;
    }

    /// Remove and return a pending flow.
    pub async fn take(&self, flow_id: &str) -> Option<PendingFlow> {
        self.pending.remove(flow_id).await
    }
}

impl Default for FlowSessions {
    fn default() -> Self {
        Self::new(DEFAULT_FLOW_TTL)
    }
}

impl std::fmt::Debug for FlowSessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowSessions")
            .field("pending", &self.pending.entry_count())
            .finish()
    }
}
