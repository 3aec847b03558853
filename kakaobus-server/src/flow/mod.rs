//! Configuration flows.
//!
//! Setup is two steps: enter a stop id, then pick routes. Afterwards the
//! options flow can change routes, quiet hours and poll interval at any
//! time. Steps are plain functions; what a step needs from the previous one
//! is passed back in as an immutable draft.

pub mod config_flow;
mod form;
pub mod options_flow;

pub use config_flow::{RouteSelection, SelectStep, StopDraft, StopInput, UserStep};
pub use form::{
    AbortReason, BASE_ERROR_KEY, FieldKind, FlowError, FlowForm, FlowResult, FormField, StepId,
};
pub use options_flow::{OptionsDraft, OptionsInput, OptionsStep};
