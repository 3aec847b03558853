//! Initial setup flow: stop lookup, then route selection.
//!
//! State between the two steps lives in an immutable [`StopDraft`] that the
//! caller keeps and hands back to the next step.

use serde::Deserialize;
use tracing::debug;

use crate::consts::{CONF_BUSES, CONF_STOP_ID};
use crate::domain::{RouteCatalog, StopData, StopId, StopOptions};
use crate::host::{ConfigEntryStore, NewEntry};
use crate::kakao::{KakaoClient, lookup_stop};

use super::form::{AbortReason, BASE_ERROR_KEY, FlowError, FlowForm, FormField, StepId};

/// Submission of the stop entry step.
#[derive(Debug, Clone, Deserialize)]
pub struct StopInput {
    pub stop_id: String,
}

/// Submission of the route selection step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteSelection {
    /// Chosen routes. Omitted means the form default: every route.
    #[serde(default, rename = "buses")]
    pub routes: Option<Vec<String>>,
}

/// What the flow knows after a successful stop lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopDraft {
    stop_id: StopId,
    stop_name: String,
    catalog: RouteCatalog,
}

impl StopDraft {
    pub fn stop_id(&self) -> &StopId {
        &self.stop_id
    }

    pub fn stop_name(&self) -> &str {
        &self.stop_name
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    #[cfg(test)]
    pub(crate) fn for_testing(stop_id: &str, stop_name: &str, routes: &[&str]) -> Self {
        Self {
            stop_id: StopId::parse(stop_id).unwrap(),
            stop_name: stop_name.to_string(),
            catalog: routes
                .iter()
                .map(|r| crate::domain::RouteCatalogEntry::new(*r, None))
                .collect(),
        }
    }
}

/// Result of the stop entry step.
#[derive(Debug, Clone)]
pub enum UserStep {
    /// Stay on the stop entry form.
    Form(FlowForm),
    /// Lookup succeeded; show the route selection form.
    SelectRoutes { draft: StopDraft, form: FlowForm },
    /// The stop is already configured.
    Abort(AbortReason),
}

/// Result of the route selection step.
#[derive(Debug, Clone)]
pub enum SelectStep {
    /// Stay on the route selection form.
    Form(FlowForm),
    /// Selection accepted; store this entry.
    Create(NewEntry),
}

/// The empty stop entry form.
pub fn user_form() -> FlowForm {
    FlowForm::new(StepId::User, vec![FormField::text(CONF_STOP_ID, true)])
}

/// The route selection form for a draft, with every route pre-selected.
pub fn select_form(draft: &StopDraft) -> FlowForm {
    FlowForm::new(
        StepId::SelectBus,
        vec![
            FormField::multi_select(CONF_BUSES, draft.catalog.clone())
                .with_default(draft.catalog.route_ids()),
        ],
    )
}

/// Handle a submitted stop id.
pub async fn step_user(
    client: &KakaoClient,
    store: &ConfigEntryStore,
    input: StopInput,
) -> UserStep {
    let stop_id = match StopId::parse(&input.stop_id) {
        Ok(id) => id,
        Err(e) => {
            debug!(input = %input.stop_id, error = %e, "Rejected stop id");
            return UserStep::Form(user_form().with_error(BASE_ERROR_KEY, FlowError::InvalidStopId));
        }
    };

    if store.is_configured(stop_id.as_str()).await {
        return UserStep::Abort(AbortReason::AlreadyConfigured);
    }

    let Some(info) = lookup_stop(client, &stop_id).await else {
        return UserStep::Form(user_form().with_error(BASE_ERROR_KEY, FlowError::InvalidStopId));
    };

    let draft = StopDraft {
        stop_id,
        stop_name: info.stop_name,
        catalog: info.catalog,
    };
    let form = select_form(&draft);

    UserStep::SelectRoutes { draft, form }
}

/// Handle a submitted route selection.
pub fn step_select(draft: &StopDraft, selection: RouteSelection) -> SelectStep {
    let routes = selection
        .routes
        .unwrap_or_else(|| draft.catalog.route_ids());

    let Some(routes) = validate_routes(&draft.catalog, routes) else {
        return SelectStep::Form(select_form(draft).with_error(CONF_BUSES, FlowError::InvalidRoute));
    };

    SelectStep::Create(NewEntry {
        title: format!("Bus Stop {}", draft.stop_id),
        unique_id: draft.stop_id.to_string(),
        data: StopData {
            stop_id: draft.stop_id.clone(),
            stop_name: draft.stop_name.clone(),
        },
        options: StopOptions::with_routes(routes),
    })
}

/// Check every route is offered by the catalog and drop repeats, keeping the
/// first occurrence. `None` if any route is not offered.
pub(super) fn validate_routes(catalog: &RouteCatalog, routes: Vec<String>) -> Option<Vec<String>> {
    let mut selected: Vec<String> = Vec::with_capacity(routes.len());
    for route in routes {
        if !catalog.contains(&route) {
            return None;
        }
        if !selected.contains(&route) {
            selected.push(route);
        }
    }
    Some(selected)
}
