//! Core types for calendar synchronization.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConfigError, InventoryError, PersistenceError};
use crate::sync::event_codec::EncodeError;
use crate::task::TaskId;

/// Prefix of every resource pushed by this crate.
pub const RESOURCE_PREFIX: &str = "sp-task-";

/// Name of a remote calendar resource, without the `.ics` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The resource for a task. Depends on the task id only, so repeated
    /// pushes always land on the same resource.
    pub fn for_task(task_id: &TaskId) -> Self {
        Self(format!("{RESOURCE_PREFIX}{task_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the calendar should do about a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDecision {
    /// Create or overwrite the remote event.
    Sync,
    /// Remove the remote event.
    Delete,
    /// Leave the remote side alone.
    Ignore,
}

/// Result of applying one task to the remote calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Pushed(ResourceId),
    Removed(ResourceId),
    Ignored,
}

/// Counts reported at the end of a full sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Tasks upserted successfully.
    pub synced: usize,
    /// Tasks whose upsert failed.
    pub failed: usize,
    /// Orphaned resources deleted.
    pub orphans_removed: usize,
    /// Orphaned resources whose delete failed.
    pub orphan_failures: usize,
}

impl SweepSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.orphan_failures > 0
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Calendar sync finished: {} synced, {} failed",
            self.synced, self.failed
        )?;
        if self.orphans_removed > 0 || self.orphan_failures > 0 {
            write!(
                f,
                "; {} orphaned events removed, {} removals failed",
                self.orphans_removed, self.orphan_failures
            )?;
        }
        Ok(())
    }
}

/// Failure talking to the remote calendar.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Transport failure before any status was received.
    #[error("Remote calendar unavailable: {0}")]
    Unavailable(String),

    /// The server answered with a non-success status.
    #[error("Remote calendar rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Unavailable(err.to_string())
    }
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Failed to persist sync state: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Task inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Cannot encode task: {0}")]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_depends_only_on_task_id() {
        let id = TaskId::from("abc-123");
        assert_eq!(ResourceId::for_task(&id).as_str(), "sp-task-abc-123");
        assert_eq!(ResourceId::for_task(&id), ResourceId::for_task(&id.clone()));
    }

    #[test]
    fn summary_message_counts() {
        let summary = SweepSummary {
            synced: 2,
            failed: 1,
            ..SweepSummary::default()
        };
        assert!(summary.has_failures());
        assert_eq!(
            summary.to_string(),
            "Calendar sync finished: 2 synced, 1 failed"
        );
    }

    #[test]
    fn summary_mentions_orphans_when_present() {
        let summary = SweepSummary {
            synced: 3,
            orphans_removed: 1,
            ..SweepSummary::default()
        };
        assert!(!summary.has_failures());
        assert!(summary.to_string().ends_with("1 orphaned events removed, 0 removals failed"));
    }

    #[test]
    fn rejected_error_carries_status_and_body() {
        let err = RemoteError::Rejected {
            status: 403,
            body: "forbidden".into(),
        };
        assert_eq!(
            err.to_string(),
            "Remote calendar rejected request (403): forbidden"
        );
    }
}
