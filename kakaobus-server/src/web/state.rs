//! Application state for the web layer.

use std::sync::Arc;

use crate::host::{FlowSessions, Integration};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded stops and the config-entry store
    pub integration: Integration,

    /// Flows waiting for their next step
    pub flows: Arc<FlowSessions>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(integration: Integration, flows: FlowSessions) -> Self {
        Self {
            integration,
            flows: Arc::new(flows),
        }
    }
}
