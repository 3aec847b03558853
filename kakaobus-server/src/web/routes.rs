//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::coordinator::BusDataCoordinator;
use crate::flow::{
    AbortReason, FlowResult, OptionsInput, OptionsStep, RouteSelection, SelectStep, StopInput,
    UserStep, config_flow, options_flow,
};
use crate::host::{EntryId, PendingFlow, RegistryError, StoreError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/entries", get(list_entries))
        .route("/api/entries/:entry_id", delete(delete_entry))
        .route("/api/entries/:entry_id/sensors", get(entry_sensors))
        .route("/api/entries/:entry_id/refresh", post(refresh_entry))
        .route("/api/entries/:entry_id/options", post(start_options_flow))
        .route("/api/flows", post(start_config_flow))
        .route("/api/flows/:flow_id", post(submit_config_flow))
        .route("/api/options/:flow_id", post(submit_options_flow))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List config entries.
async fn list_entries(State(state): State<AppState>) -> Json<EntriesResponse> {
    let entries = state
        .integration
        .store()
        .entries()
        .await
        .iter()
        .map(EntrySummary::from)
        .collect();

    Json(EntriesResponse { entries })
}

/// Remove an entry and stop its coordinator.
async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<EntrySummary>, AppError> {
    let entry_id = EntryId::new(entry_id);
    let entry = state.integration.remove_entry(&entry_id).await?;
    Ok(Json(EntrySummary::from(&entry)))
}

/// Sensor states for an entry's selected routes.
async fn entry_sensors(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<SensorsResponse>, AppError> {
    let entry_id = EntryId::new(entry_id);
    let sensors = state.integration.sensors(&entry_id).await?;
    let coordinator = loaded_coordinator(&state, &entry_id).await?;

    let mut states = Vec::with_capacity(sensors.len());
    for sensor in &sensors {
        states.push(sensor.state().await);
    }

    Ok(Json(SensorsResponse {
        entry_id,
        status: coordinator.status().await,
        sensors: states,
    }))
}

/// Force a refresh outside the schedule.
async fn refresh_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<RefreshResponse>, AppError> {
    let entry_id = EntryId::new(entry_id);
    let coordinator = loaded_coordinator(&state, &entry_id).await?;

    let outcome = coordinator.refresh().await;
    Ok(Json(RefreshResponse::new(outcome, coordinator.status().await)))
}

/// Start a config flow.
///
/// Without a body this shows the stop id form; with `{"stop_id": ...}` it
/// submits the first step directly.
async fn start_config_flow(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FlowResponse>, AppError> {
    let Some(input) = optional_json::<StopInput>(&body)? else {
        return Ok(Json(FlowResponse::done(FlowResult::Form(
            config_flow::user_form(),
        ))));
    };

    let step = config_flow::step_user(
        state.integration.client(),
        state.integration.store(),
        input,
    )
    .await;

    let response = match step {
        UserStep::Form(form) => FlowResponse::done(FlowResult::Form(form)),
        UserStep::Abort(reason) => FlowResponse::done(FlowResult::Abort { reason }),
        UserStep::SelectRoutes { draft, form } => {
            let flow_id = state.flows.start(PendingFlow::Config(draft)).await;
            FlowResponse::pending(flow_id, FlowResult::Form(form))
        }
    };

    Ok(Json(response))
}

/// Submit the route selection of a pending config flow.
async fn submit_config_flow(
    State(state): State<AppState>,
    Path(flow_id): Path<String>,
    body: Bytes,
) -> Result<Json<FlowResponse>, AppError> {
    // Parsed before the flow is taken, so a bad body leaves it pending.
    let selection = optional_json::<RouteSelection>(&body)?.unwrap_or_default();

    let draft = match state.flows.take(&flow_id).await {
        Some(PendingFlow::Config(draft)) => draft,
        Some(other) => {
            state.flows.resume(&flow_id, other).await;
            return Err(unknown_flow(&flow_id));
        }
        None => return Err(unknown_flow(&flow_id)),
    };

    match config_flow::step_select(&draft, selection) {
        SelectStep::Form(form) => {
            state.flows.resume(&flow_id, PendingFlow::Config(draft)).await;
            Ok(Json(FlowResponse::pending(flow_id, FlowResult::Form(form))))
        }
        SelectStep::Create(new) => match state.integration.create_entry(new).await {
            Ok(entry) => Ok(Json(FlowResponse::done(FlowResult::CreateEntry {
                title: entry.title,
                entry_id: entry.entry_id,
            }))),
            // Another flow configured the same stop in the meantime.
            Err(RegistryError::Store(StoreError::AlreadyConfigured { unique_id })) => {
                debug!(unique_id = %unique_id, "Stop configured by a concurrent flow");
                Ok(Json(FlowResponse::done(FlowResult::Abort {
                    reason: AbortReason::AlreadyConfigured,
                })))
            }
            Err(e) => Err(e.into()),
        },
    }
}

/// Start the options flow for an entry.
async fn start_options_flow(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<FlowResponse>, AppError> {
    let entry_id = EntryId::new(entry_id);
    let entry = state
        .integration
        .store()
        .get(&entry_id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown config entry: {entry_id}"),
        })?;

    let (draft, form) = options_flow::step_init(state.integration.client(), &entry).await;
    let flow_id = state.flows.start(PendingFlow::Options(draft)).await;

    Ok(Json(FlowResponse::pending(flow_id, FlowResult::Form(form))))
}

/// Submit a pending options flow.
async fn submit_options_flow(
    State(state): State<AppState>,
    Path(flow_id): Path<String>,
    body: Bytes,
) -> Result<Json<FlowResponse>, AppError> {
    let input = optional_json::<OptionsInput>(&body)?.unwrap_or_default();

    let draft = match state.flows.take(&flow_id).await {
        Some(PendingFlow::Options(draft)) => draft,
        Some(other) => {
            state.flows.resume(&flow_id, other).await;
            return Err(unknown_flow(&flow_id));
        }
        None => return Err(unknown_flow(&flow_id)),
    };

    match options_flow::step_submit(&draft, input) {
        OptionsStep::Form(form) => {
            state.flows.resume(&flow_id, PendingFlow::Options(draft)).await;
            Ok(Json(FlowResponse::pending(flow_id, FlowResult::Form(form))))
        }
        OptionsStep::Save(options) => {
            let entry = state
                .integration
                .update_options(draft.entry_id(), options)
                .await?;
            Ok(Json(FlowResponse::done(FlowResult::CreateEntry {
                title: entry.title,
                entry_id: entry.entry_id,
            })))
        }
    }
}

async fn loaded_coordinator(
    state: &AppState,
    entry_id: &EntryId,
) -> Result<BusDataCoordinator, AppError> {
    state
        .integration
        .coordinator(entry_id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("Config entry not loaded: {entry_id}"),
        })
}

/// Parse a JSON request body that may be left empty.
///
/// An empty body is `None`. Anything else must be valid JSON of the right
/// shape; a submission that fails to parse is rejected, never treated as
/// omitted.
fn optional_json<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::BadRequest {
            message: format!("Invalid request body: {e}"),
        })
}

fn unknown_flow(flow_id: &str) -> AppError {
    AppError::NotFound {
        message: format!("Unknown or expired flow: {flow_id}"),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            StoreError::AlreadyConfigured { .. } => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Store(e) => e.into(),
            RegistryError::NotLoaded { .. } => AppError::NotFound {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            warn!(status = %status, "{message}");
        } else {
            debug!(status = %status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
