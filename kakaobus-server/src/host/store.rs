//! Disk-backed config-entry store.
//!
//! The store is the only state shared between flows and running
//! coordinators. Every mutation runs under one write lock and is persisted
//! before it becomes visible, so a failed write leaves the previous state in
//! place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::consts::DOMAIN;
use crate::domain::StopOptions;

use super::entry::{ConfigEntry, EntryId, NewEntry};

/// Current on-disk format version.
const STORE_VERSION: u32 = 1;

/// Errors from the config-entry store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading the store file failed
    #[error("failed to read store: {message}")]
    Read { message: String },

    /// Writing the store file failed
    #[error("failed to write store: {message}")]
    Write { message: String },

    /// An entry with the same unique id already exists
    #[error("an entry for {unique_id} is already configured")]
    AlreadyConfigured { unique_id: String },

    /// No entry with the given id
    #[error("config entry {entry_id} not found")]
    NotFound { entry_id: EntryId },
}

/// Serialized store contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    /// Sequence number for the next entry id.
    next_seq: u64,
    entries: Vec<ConfigEntry>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            next_seq: 1,
            entries: Vec::new(),
        }
    }
}

/// Thread-safe config-entry store.
#[derive(Debug, Clone)]
pub struct ConfigEntryStore {
    inner: Arc<RwLock<StoreFile>>,
    path: Option<Arc<PathBuf>>,
}

impl ConfigEntryStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let file = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| StoreError::Read {
                message: format!("{}: {}", path.display(), e),
            })?;
            let file: StoreFile =
                serde_json::from_str(&contents).map_err(|e| StoreError::Read {
                    message: format!("{}: {}", path.display(), e),
                })?;
            if file.version != STORE_VERSION {
                return Err(StoreError::Read {
                    message: format!(
                        "{}: unsupported store version {}",
                        path.display(),
                        file.version
                    ),
                });
            }
            file
        } else {
            StoreFile::default()
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(file)),
            path: Some(Arc::new(path)),
        })
    }

    /// Create a store that is never written to disk (for tests).
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreFile::default())),
            path: None,
        }
    }

    /// All entries, in creation order.
    pub async fn entries(&self) -> Vec<ConfigEntry> {
        self.inner.read().await.entries.clone()
    }

    /// Look up an entry by id.
    pub async fn get(&self, entry_id: &EntryId) -> Option<ConfigEntry> {
        let guard = self.inner.read().await;
        guard
            .entries
            .iter()
            .find(|e| &e.entry_id == entry_id)
            .cloned()
    }

    /// Current options of an entry.
    pub async fn options(&self, entry_id: &EntryId) -> Option<StopOptions> {
        let guard = self.inner.read().await;
        guard
            .entries
            .iter()
            .find(|e| &e.entry_id == entry_id)
            .map(|e| e.options.clone())
    }

    /// Whether an entry with this unique id exists.
    pub async fn is_configured(&self, unique_id: &str) -> bool {
        let guard = self.inner.read().await;
        guard.entries.iter().any(|e| e.unique_id == unique_id)
    }

    /// Store a new entry and assign it an id.
    pub async fn add(&self, new: NewEntry) -> Result<ConfigEntry, StoreError> {
        let mut guard = self.inner.write().await;

        if guard.entries.iter().any(|e| e.unique_id == new.unique_id) {
            return Err(StoreError::AlreadyConfigured {
                unique_id: new.unique_id,
            });
        }

        let entry = ConfigEntry {
            entry_id: EntryId::new(format!("{:08x}", guard.next_seq)),
            domain: DOMAIN.to_string(),
            title: new.title,
            unique_id: new.unique_id,
            data: new.data,
            options: new.options,
        };

        let mut next = guard.clone();
        next.next_seq += 1;
        next.entries.push(entry.clone());
        self.commit(&mut guard, next)?;

        Ok(entry)
    }

    /// Replace the options of an entry. Data and identity are untouched.
    pub async fn update_options(
        &self,
        entry_id: &EntryId,
        options: StopOptions,
    ) -> Result<ConfigEntry, StoreError> {
        let mut guard = self.inner.write().await;

        let mut next = guard.clone();
        let entry = next
            .entries
            .iter_mut()
            .find(|e| &e.entry_id == entry_id)
            .ok_or_else(|| StoreError::NotFound {
                entry_id: entry_id.clone(),
            })?;
        entry.options = options;
        let updated = entry.clone();

        self.commit(&mut guard, next)?;
        Ok(updated)
    }

    /// Remove an entry, returning it.
    pub async fn remove(&self, entry_id: &EntryId) -> Result<ConfigEntry, StoreError> {
        let mut guard = self.inner.write().await;

        let mut next = guard.clone();
        let idx = next
            .entries
            .iter()
            .position(|e| &e.entry_id == entry_id)
            .ok_or_else(|| StoreError::NotFound {
                entry_id: entry_id.clone(),
            })?;
        let removed = next.entries.remove(idx);

        self.commit(&mut guard, next)?;
        Ok(removed)
    }

    /// Get the store file path, if disk-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Persist `next`, then make it the current state.
    fn commit(&self, current: &mut StoreFile, next: StoreFile) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            write_file(path, &next)?;
        }
        *current = next;
        Ok(())
    }
}

/// Write the store atomically: temp file, then rename.
///
/// Creates parent directories if they don't exist.
fn write_file(path: &Path, file: &StoreFile) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Write {
            message: format!("failed to create store directory: {}", e),
        })?;
    }

    let json = serde_json::to_string_pretty(file).map_err(|e| StoreError::Write {
        message: format!("failed to serialize store: {}", e),
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| StoreError::Write {
        message: format!("failed to write {}: {}", tmp.display(), e),
    })?;
    std::fs::rename(&tmp, path).map_err(|e| StoreError::Write {
        message: format!("failed to replace {}: {}", path.display(), e),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StopData, StopId};
    use tempfile::tempdir;

    fn new_entry(stop_id: &str) -> NewEntry {
        NewEntry {
            title: format!("Bus Stop {stop_id}"),
            unique_id: stop_id.to_string(),
            data: StopData {
                stop_id: StopId::parse(stop_id).unwrap(),
                stop_name: "Lotte Castle".to_string(),
            },
            options: StopOptions::with_routes(vec!["126".to_string()]),
        }
    }

    #[tokio::test]
    async fn add_assigns_sequential_ids() {
        let store = ConfigEntryStore::in_memory();

        let a = store.add(new_entry("BS1")).await.unwrap();
        let b = store.add(new_entry("BS2")).await.unwrap();

        assert_eq!(a.entry_id.as_str(), "00000001");
        assert_eq!(b.entry_id.as_str(), "00000002");
        assert_eq!(a.domain, DOMAIN);
        assert_eq!(store.entries().await.len(), 2);
        assert!(store.is_configured("BS1").await);
        assert!(!store.is_configured("BS3").await);
    }

    #[tokio::test]
    async fn add_rejects_duplicate_unique_id() {
        let store = ConfigEntryStore::in_memory();
        store.add(new_entry("BS1")).await.unwrap();

        let err = store.add(new_entry("BS1")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyConfigured { .. }));
        assert_eq!(store.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn update_options_keeps_identity() {
        let store = ConfigEntryStore::in_memory();
        let entry = store.add(new_entry("BS1")).await.unwrap();

        let options = StopOptions {
            routes: vec!["720".to_string()],
            quiet_start: "23:00".to_string(),
            quiet_end: "06:00".to_string(),
            scan_interval: 120,
        };
        let updated = store
            .update_options(&entry.entry_id, options.clone())
            .await
            .unwrap();

        assert_eq!(updated.options, options);
        assert_eq!(updated.data, entry.data);
        assert_eq!(updated.title, entry.title);
        assert_eq!(store.options(&entry.entry_id).await, Some(options));
    }

    #[tokio::test]
    async fn update_unknown_entry_fails() {
        let store = ConfigEntryStore::in_memory();
        let err = store
            .update_options(&EntryId::new("missing"), StopOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn remove_entry() {
        let store = ConfigEntryStore::in_memory();
        let entry = store.add(new_entry("BS1")).await.unwrap();

        let removed = store.remove(&entry.entry_id).await.unwrap();
        assert_eq!(removed.entry_id, entry.entry_id);
        assert!(store.get(&entry.entry_id).await.is_none());
        assert!(store.remove(&entry.entry_id).await.is_err());

        // The stop can be configured again, under a fresh id.
        let again = store.add(new_entry("BS1")).await.unwrap();
        assert_ne!(again.entry_id, entry.entry_id);
    }

    #[tokio::test]
    async fn persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("entries.json");

        let entry = {
            let store = ConfigEntryStore::open(&path).unwrap();
            let entry = store.add(new_entry("BS1")).await.unwrap();
            store
                .update_options(&entry.entry_id, StopOptions::with_routes(vec!["9".into()]))
                .await
                .unwrap()
        };
        assert!(path.exists());

        let reopened = ConfigEntryStore::open(&path).unwrap();
        assert_eq!(reopened.entries().await, vec![entry]);

        // Sequence survives a reload.
        let next = reopened.add(new_entry("BS2")).await.unwrap();
        assert_eq!(next.entry_id.as_str(), "00000002");
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = ConfigEntryStore::open(dir.path().join("none.json")).unwrap();
        assert!(store.path().is_some());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ConfigEntryStore::open(&path),
            Err(StoreError::Read { .. })
        ));
    }
}
