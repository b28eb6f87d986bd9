//! Read access to the host's task collection.

use std::path::{Path, PathBuf};

use super::{Task, TaskId};
use crate::error::InventoryError;

/// The host's authoritative task collection.
pub trait TaskInventory {
    /// Every task the host knows about.
    fn list(&self) -> Result<Vec<Task>, InventoryError>;

    /// Current snapshot of one task, or `None` if the host no longer has it.
    fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, InventoryError> {
        Ok(self.list()?.into_iter().find(|task| &task.id == id))
    }
}

impl TaskInventory for Vec<Task> {
    fn list(&self) -> Result<Vec<Task>, InventoryError> {
        Ok(self.clone())
    }
}

/// Inventory backed by a JSON array exported by the host.
///
/// The file is re-read on every call so event handlers always see the
/// latest export.
#[derive(Debug, Clone)]
pub struct JsonFileInventory {
    path: PathBuf,
}

impl JsonFileInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskInventory for JsonFileInventory {
    fn list(&self) -> Result<Vec<Task>, InventoryError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| InventoryError::ReadFailed {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| InventoryError::ParseFailed {
            path: self.path.clone(),
            source,
        })
    }
}
