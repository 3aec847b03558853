//! Integration registry: setup and teardown of configured stops.
//!
//! The registry owns one [`StopInstance`] per loaded config entry: the
//! stop's coordinator and the task running its refresh loop. Nothing else
//! holds coordinators for longer than a request.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::coordinator::BusDataCoordinator;
use crate::domain::StopOptions;
use crate::kakao::KakaoClient;
use crate::sensor::RouteSensor;

use super::entry::{ConfigEntry, EntryId, NewEntry};
use super::store::{ConfigEntryStore, StoreError};

/// Errors from integration lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The entry exists in the store but is not loaded
    #[error("config entry {entry_id} is not loaded")]
    NotLoaded { entry_id: EntryId },
}

/// A loaded stop: its coordinator and refresh task.
#[derive(Debug)]
struct StopInstance {
    coordinator: BusDataCoordinator,
    task: JoinHandle<()>,
}

/// The running integration.
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone)]
pub struct Integration {
    client: KakaoClient,
    store: ConfigEntryStore,
    instances: Arc<RwLock<HashMap<EntryId, StopInstance>>>,
}

impl Integration {
    pub fn new(client: KakaoClient, store: ConfigEntryStore) -> Self {
        Self {
            client,
            store,
            instances: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn client(&self) -> &KakaoClient {
        &self.client
    }

    pub fn store(&self) -> &ConfigEntryStore {
        &self.store
    }

    /// Load every stored entry. Returns the number of entries loaded.
    pub async fn setup_all(&self) -> usize {
        let entries = self.store.entries().await;
        join_all(entries.iter().map(|e| self.setup_entry(e)))
            .await
            .into_iter()
            .filter(|loaded| *loaded)
            .count()
    }

    /// Load one entry: run the first refresh, then start its refresh loop.
    ///
    /// A failed first refresh does not stop setup; the loop keeps trying on
    /// the configured interval. Loading an already-loaded entry replaces it.
    /// Returns false if the entry left the store before setup finished.
    pub async fn setup_entry(&self, entry: &ConfigEntry) -> bool {
        let coordinator = BusDataCoordinator::new(
            self.client.clone(),
            self.store.clone(),
            entry.entry_id.clone(),
            entry.data.stop_id.clone(),
        );

        if let Err(e) = coordinator.refresh().await {
            warn!(
                entry_id = %entry.entry_id,
                error = %e,
                "First refresh failed, will retry on schedule"
            );
        }

        // `remove_entry` deletes from the store before unloading, so checking
        // the store under the instances lock cannot leave an orphan behind.
        let mut instances = self.instances.write().await;
        if self.store.get(&entry.entry_id).await.is_none() {
            debug!(entry_id = %entry.entry_id, "Entry removed during setup, not loading");
            return false;
        }

        let task = tokio::spawn(coordinator.clone().run());
        let instance = StopInstance { coordinator, task };
        if let Some(previous) = instances.insert(entry.entry_id.clone(), instance) {
            previous.task.abort();
        }
        drop(instances);

        info!(
            entry_id = %entry.entry_id,
            stop_id = %entry.data.stop_id,
            routes = entry.options.routes.len(),
            "Set up bus stop"
        );
        true
    }

    /// Store an entry produced by the config flow and load it.
    pub async fn create_entry(&self, new: NewEntry) -> Result<ConfigEntry, RegistryError> {
        let entry = self.store.add(new).await?;
        self.setup_entry(&entry).await;
        Ok(entry)
    }

    /// Replace an entry's options. The running coordinator picks them up on
    /// its next tick; sensors follow the new route list immediately.
    pub async fn update_options(
        &self,
        entry_id: &EntryId,
        options: StopOptions,
    ) -> Result<ConfigEntry, RegistryError> {
        let entry = self.store.update_options(entry_id, options).await?;
        info!(
            entry_id = %entry_id,
            routes = entry.options.routes.len(),
            scan_interval = entry.options.scan_interval,
            "Updated bus stop options"
        );
        Ok(entry)
    }

    /// Stop an entry's refresh loop. Returns whether it was loaded.
    pub async fn unload_entry(&self, entry_id: &EntryId) -> bool {
        let Some(instance) = self.instances.write().await.remove(entry_id) else {
            return false;
        };
        instance.task.abort();
        true
    }

    /// Unload an entry and delete it from the store.
    pub async fn remove_entry(&self, entry_id: &EntryId) -> Result<ConfigEntry, RegistryError> {
        let removed = self.store.remove(entry_id).await;
        self.unload_entry(entry_id).await;
        let entry = removed?;
        info!(entry_id = %entry_id, stop_id = %entry.data.stop_id, "Removed bus stop");
        Ok(entry)
    }

    /// Coordinator of a loaded entry.
    pub async fn coordinator(&self, entry_id: &EntryId) -> Option<BusDataCoordinator> {
        self.instances
            .read()
            .await
            .get(entry_id)
            .map(|i| i.coordinator.clone())
    }

    /// Sensors of a loaded entry, one per selected route.
    pub async fn sensors(&self, entry_id: &EntryId) -> Result<Vec<RouteSensor>, RegistryError> {
        let entry = self
            .store
            .get(entry_id)
            .await
            .ok_or_else(|| StoreError::NotFound {
                entry_id: entry_id.clone(),
            })?;

        let coordinator =
            self.coordinator(entry_id)
                .await
                .ok_or_else(|| RegistryError::NotLoaded {
                    entry_id: entry_id.clone(),
                })?;

        Ok(entry
            .options
            .routes
            .iter()
            .map(|route| RouteSensor::new(coordinator.clone(), entry.data.stop_name.clone(), route))
            .collect())
    }

    /// Number of loaded entries.
    pub async fn loaded(&self) -> usize {
        self.instances.read().await.len()
    }

    /// Stop every refresh loop.
    pub async fn shutdown(&self) {
        let mut guard = self.instances.write().await;
        for (_, instance) in guard.drain() {
            instance.task.abort();
        }
    }
}
