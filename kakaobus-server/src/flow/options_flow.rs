//! Options flow: adjust routes, quiet hours and poll interval of a
//! configured stop.
//!
//! The route list is fetched again every time the flow starts, so new
//! routes at the stop become selectable. Routes the user already picked are
//! never dropped from the choices, even if the stop stopped listing them or
//! the lookup failed.

use serde::Deserialize;
use tracing::{debug, info};

use crate::consts::{
    CONF_BUSES, CONF_QUIET_END, CONF_QUIET_START, CONF_SCAN_INTERVAL, MAX_SCAN_INTERVAL_SECS,
    MIN_SCAN_INTERVAL_SECS,
};
use crate::domain::{RouteCatalog, StopOptions, clamp_scan_interval};
use crate::host::{ConfigEntry, EntryId};
use crate::kakao::{KakaoClient, lookup_stop};

use super::config_flow::validate_routes;
use super::form::{BASE_ERROR_KEY, FlowError, FlowForm, FormField, StepId};

/// Submission of the options form. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsInput {
    #[serde(default, rename = "buses")]
    pub routes: Option<Vec<String>>,
    #[serde(default)]
    pub quiet_start: Option<String>,
    #[serde(default)]
    pub quiet_end: Option<String>,
    #[serde(default)]
    pub scan_interval: Option<u64>,
}

/// State of an options flow between showing the form and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsDraft {
    entry_id: EntryId,
    catalog: RouteCatalog,
    current: StopOptions,
    /// The route lookup failed and `catalog` only holds the old selection.
    lookup_failed: bool,
}

impl OptionsDraft {
    pub fn entry_id(&self) -> &EntryId {
        &self.entry_id
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn current(&self) -> &StopOptions {
        &self.current
    }

    pub fn lookup_failed(&self) -> bool {
        self.lookup_failed
    }
}

/// Result of an options submission.
#[derive(Debug, Clone)]
pub enum OptionsStep {
    /// Stay on the options form.
    Form(FlowForm),
    /// Replace the entry options with these.
    Save(StopOptions),
}

/// Start the options flow for an entry: refresh the route catalog and build
/// the form.
pub async fn step_init(client: &KakaoClient, entry: &ConfigEntry) -> (OptionsDraft, FlowForm) {
    let current = entry.options.clone();
    let stop_id = &entry.data.stop_id;

    let (catalog, lookup_failed) = match lookup_stop(client, stop_id).await {
        Some(info) => {
            let mut catalog = info.catalog;
            let missing = catalog.retain_selection(&current.routes);
            if !missing.is_empty() {
                debug!(stop_id = %stop_id, routes = ?missing, "Selected routes no longer listed");
            }
            (catalog, false)
        }
        None => {
            info!(stop_id = %stop_id, "Could not refresh routes, offering current selection");
            (RouteCatalog::from_stale_selection(&current.routes), true)
        }
    };

    let draft = OptionsDraft {
        entry_id: entry.entry_id.clone(),
        catalog,
        current,
        lookup_failed,
    };
    let form = options_form(&draft);

    (draft, form)
}

/// The options form for a draft, pre-filled with the current options.
pub fn options_form(draft: &OptionsDraft) -> FlowForm {
    let current = &draft.current;

    let form = FlowForm::new(
        StepId::Init,
        vec![
            FormField::text(CONF_QUIET_START, false).with_default(current.quiet_start.clone()),
            FormField::text(CONF_QUIET_END, false).with_default(current.quiet_end.clone()),
            FormField::integer(CONF_SCAN_INTERVAL, MIN_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS)
                .with_default(clamp_scan_interval(current.scan_interval)),
            FormField::multi_select(CONF_BUSES, draft.catalog.clone())
                .with_default(current.routes.clone()),
        ],
    );

    if draft.lookup_failed {
        form.with_error(BASE_ERROR_KEY, FlowError::CannotConnect)
    } else {
        form
    }
}

/// Handle a submitted options form.
///
/// A failed route lookup does not block submission.
pub fn step_submit(draft: &OptionsDraft, input: OptionsInput) -> OptionsStep {
    let current = &draft.current;

    let routes = input.routes.unwrap_or_else(|| current.routes.clone());
    let Some(routes) = validate_routes(&draft.catalog, routes) else {
        return OptionsStep::Form(options_form(draft).with_error(CONF_BUSES, FlowError::InvalidRoute));
    };

    OptionsStep::Save(StopOptions {
        routes,
        quiet_start: input
            .quiet_start
            .unwrap_or_else(|| current.quiet_start.clone()),
        quiet_end: input.quiet_end.unwrap_or_else(|| current.quiet_end.clone()),
        scan_interval: clamp_scan_interval(input.scan_interval.unwrap_or(current.scan_interval)),
    })
}
