//! Config entries: the host's record of a configured integration instance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{StopConfiguration, StopData, StopOptions};

/// Host-assigned identifier of a config entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored config entry for one bus stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: EntryId,

    /// Integration domain that owns the entry.
    pub domain: String,

    /// Display title, e.g. "Bus Stop BS219565".
    pub title: String,

    /// Uniqueness key; at most one entry per value. The stop id.
    pub unique_id: String,

    /// Immutable identity, written once at creation.
    pub data: StopData,

    /// Adjustable settings, replaced as a whole by the options flow.
    pub options: StopOptions,
}

impl ConfigEntry {
    /// Flattened view of the stop configuration.
    pub fn configuration(&self) -> StopConfiguration {
        StopConfiguration::new(&self.data, &self.options)
    }
}

/// An entry produced by a config flow, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub title: String,
    pub unique_id: String,
    pub data: StopData,
    pub options: StopOptions,
}
