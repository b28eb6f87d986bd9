//! Persisted sync state: configuration plus the task → resource mapping.
//!
//! Both live in one JSON blob so a save can never leave them disagreeing.
//! Saves go through a temp file and a rename.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::config::SyncConfig;
use crate::error::PersistenceError;
use crate::sync::ResourceId;
use crate::task::TaskId;

const STATE_FILE: &str = "state.json";

/// Durable task id → remote resource id table.
///
/// An entry records that a resource was pushed for the task. A missing entry
/// is not an error: the resource id can always be derived from the task id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping(BTreeMap<TaskId, ResourceId>);

impl Mapping {
    pub fn get(&self, task_id: &TaskId) -> Option<&ResourceId> {
        self.0.get(task_id)
    }

    /// Returns `true` if the table changed.
    pub fn put(&mut self, task_id: TaskId, resource_id: ResourceId) -> bool {
        self.0.insert(task_id, resource_id.clone()).as_ref() != Some(&resource_id)
    }

    pub fn remove(&mut self, task_id: &TaskId) -> Option<ResourceId> {
        self.0.remove(task_id)
    }

    pub fn all(&self) -> impl Iterator<Item = (&TaskId, &ResourceId)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The single persisted blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub config: SyncConfig,
    #[serde(default)]
    pub mapping: Mapping,
}

/// Location of the state blob on disk.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `state.json` inside [`super::data_dir`].
    pub fn default_location() -> std::io::Result<Self> {
        Ok(Self::new(super::data_dir()?.join(STATE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state, falling back to defaults when the blob is missing or
    /// unreadable. A corrupt blob stays on disk until the next save.
    pub fn load(&self) -> PersistedState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved state; starting empty");
                return PersistedState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read saved state; starting empty");
                return PersistedState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "saved state is corrupt; starting empty");
                PersistedState::default()
            }
        }
    }

    /// Replace the blob on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized, or if the temp
    /// file cannot be written or renamed into place.
    pub fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        let content = serde_json::to_string_pretty(state)?;
        let write_failed = |source| PersistenceError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let mut temp_name = self.path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = self.path.with_file_name(temp_name);

        std::fs::write(&temp_path, content).map_err(write_failed)?;
        std::fs::rename(&temp_path, &self.path).map_err(write_failed)?;
        Ok(())
    }
}

/// Shared mutable sync state handed to the reconciler.
///
/// Built once at startup from the persisted blob. Every mutation is written
/// through immediately; if the write fails the in-memory change is rolled
/// back so memory and disk never disagree.
#[derive(Debug)]
pub struct SyncContext {
    store: StateStore,
    state: PersistedState,
}

impl SyncContext {
    /// Load the context from its store.
    pub fn open(store: StateStore) -> Self {
        let state = store.load();
        Self { store, state }
    }

    /// Context over already-loaded state.
    pub fn with_state(store: StateStore, state: PersistedState) -> Self {
        Self { store, state }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.state.config
    }

    pub fn mapping(&self) -> &Mapping {
        &self.state.mapping
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Replace the configuration wholesale and persist.
    pub fn replace_config(&mut self, config: SyncConfig) -> Result<(), PersistenceError> {
        let previous = std::mem::replace(&mut self.state.config, config);
        self.persist_or(|state| state.config = previous)
    }

    /// Record a pushed resource. No write happens if the entry is unchanged.
    pub fn put_mapping(
        &mut self,
        task_id: TaskId,
        resource_id: ResourceId,
    ) -> Result<(), PersistenceError> {
        let previous = self.state.mapping.get(&task_id).cloned();
        if !self.state.mapping.put(task_id.clone(), resource_id) {
            return Ok(());
        }
        self.persist_or(|state| match previous {
            Some(old) => {
                state.mapping.put(task_id, old);
            }
            None => {
                state.mapping.remove(&task_id);
            }
        })
    }

    /// Drop a mapping entry, returning it if present.
    pub fn remove_mapping(&mut self, task_id: &TaskId) -> Result<Option<ResourceId>, PersistenceError> {
        let Some(removed) = self.state.mapping.remove(task_id) else {
            return Ok(None);
        };
        let restored = removed.clone();
        self.persist_or(|state| {
            state.mapping.put(task_id.clone(), restored);
        })?;
        Ok(Some(removed))
    }

    /// Drop every mapping entry. Returns how many were removed.
    pub fn clear_mapping(&mut self) -> Result<usize, PersistenceError> {
        let previous = std::mem::take(&mut self.state.mapping);
        let count = previous.len();
        self.persist_or(|state| state.mapping = previous)?;
        Ok(count)
    }

    fn persist_or(
        &mut self,
        rollback: impl FnOnce(&mut PersistedState),
    ) -> Result<(), PersistenceError> {
        let result = self.store.save(&self.state);
        if result.is_err() {
            rollback(&mut self.state);
        }
        result
    }
}
