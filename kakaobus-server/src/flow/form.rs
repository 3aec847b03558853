//! Flow results and form descriptions.
//!
//! Flows never render anything themselves. Each step returns a
//! [`FlowResult`]: a form to show (with its fields, defaults and errors), a
//! finished entry, or an abort.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::domain::RouteCatalog;
use crate::host::EntryId;

/// Key under which errors not tied to one field are reported.
pub const BASE_ERROR_KEY: &str = "base";

/// Flow step identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Stop id entry.
    User,
    /// Route selection after a successful stop lookup.
    SelectBus,
    /// Options flow.
    Init,
}

/// Errors shown on a form. The flow stays on the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowError {
    InvalidStopId,
    InvalidRoute,
    CannotConnect,
}

/// Why a flow ended without creating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    AlreadyConfigured,
}

/// Input widget for a form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer { min: u64, max: u64 },
    MultiSelect { choices: RouteCatalog },
}

/// One field of a form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub key: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FormField {
    pub fn text(key: &'static str, required: bool) -> Self {
        Self {
            key,
            required,
            default: None,
            kind: FieldKind::Text,
        }
    }

    pub fn integer(key: &'static str, min: u64, max: u64) -> Self {
        Self {
            key,
            required: false,
            default: None,
            kind: FieldKind::Integer { min, max },
        }
    }

    pub fn multi_select(key: &'static str, choices: RouteCatalog) -> Self {
        Self {
            key,
            required: true,
            default: None,
            kind: FieldKind::MultiSelect { choices },
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A form to show for a flow step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowForm {
    pub step_id: StepId,
    pub fields: Vec<FormField>,
    pub errors: BTreeMap<&'static str, FlowError>,
}

impl FlowForm {
    pub fn new(step_id: StepId, fields: Vec<FormField>) -> Self {
        Self {
            step_id,
            fields,
            errors: BTreeMap::new(),
        }
    }

    /// Attach an error to a field, or to [`BASE_ERROR_KEY`].
    pub fn with_error(mut self, key: &'static str, error: FlowError) -> Self {
        self.errors.insert(key, error);
        self
    }

    pub fn error(&self, key: &str) -> Option<FlowError> {
        self.errors.get(key).copied()
    }

    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Outcome of a flow step, as reported to the host UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowResult {
    Form(FlowForm),
    CreateEntry { title: String, entry_id: EntryId },
    Abort { reason: AbortReason },
}
