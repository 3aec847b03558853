//! Route catalog for a stop.
//!
//! The catalog is the list of routes a user can pick from during
//! configuration. It is rebuilt on every lookup and never persisted: only the
//! chosen route ids survive, inside the entry options.

use serde::Serialize;

/// A selectable route with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCatalogEntry {
    /// Route name as published upstream (e.g. "126").
    pub route_id: String,
    /// Label shown to the user (e.g. "126 (Sujeong)").
    pub display_label: String,
}

impl RouteCatalogEntry {
    /// Build an entry, appending ` (direction)` when a direction is known.
    pub fn new(route_id: impl Into<String>, direction: Option<&str>) -> Self {
        let route_id = route_id.into();
        let display_label = match direction {
            Some(d) if !d.is_empty() => format!("{route_id} ({d})"),
            _ => route_id.clone(),
        };
        Self {
            route_id,
            display_label,
        }
    }

    /// An entry for a selected route the last lookup could not confirm.
    fn stale(route_id: &str) -> Self {
        Self {
            route_id: route_id.to_string(),
            display_label: format!("{route_id} (stale)"),
        }
    }

    /// An entry for a selected route the upstream no longer lists.
    fn not_found(route_id: &str) -> Self {
        Self {
            route_id: route_id.to_string(),
            display_label: format!("{route_id} (old, not found)"),
        }
    }
}

/// Ordered route catalog, unique by route id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteCatalog {
    entries: Vec<RouteCatalogEntry>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A later entry with the same route id replaces the
    /// earlier label but keeps its position.
    pub fn insert(&mut self, entry: RouteCatalogEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.route_id == entry.route_id)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Catalog made only of previously selected routes, each labeled stale.
    ///
    /// Used when the upstream lookup fails during reconfiguration.
    pub fn from_stale_selection(selected: &[String]) -> Self {
        let mut catalog = Self::new();
        for route in selected {
            catalog.insert(RouteCatalogEntry::stale(route));
        }
        catalog
    }

    /// Add every selected route missing from the catalog, labeled as no
    /// longer found, so that it stays selectable.
    ///
    /// Returns the route ids that were added.
    pub fn retain_selection(&mut self, selected: &[String]) -> Vec<String> {
        let mut added = Vec::new();
        for route in selected {
            if !self.contains(route) {
                self.entries.push(RouteCatalogEntry::not_found(route));
                added.push(route.clone());
            }
        }
        added
    }

    pub fn contains(&self, route_id: &str) -> bool {
        self.entries.iter().any(|e| e.route_id == route_id)
    }

    /// Display label for a route, if present.
    pub fn label(&self, route_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.route_id == route_id)
            .map(|e| e.display_label.as_str())
    }

    /// Route ids in catalog order.
    pub fn route_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.route_id.clone()).collect()
    }

    pub fn entries(&self) -> &[RouteCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RouteCatalogEntry> for RouteCatalog {
    fn from_iter<I: IntoIterator<Item = RouteCatalogEntry>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for entry in iter {
            catalog.insert(entry);
        }
        catalog
    }
}
