//! Task lifecycle events delivered by the host.
//!
//! Hosts reference the affected task either by bare id or by a task-like
//! object carrying an `id` field. Both forms collapse to a [`TaskId`] here
//! so nothing downstream sees the loose shape.

use serde::{Deserialize, Deserializer, Serialize};

use super::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    Updated,
    Deleted,
    Completed,
}

/// A single task lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub kind: TaskEventKind,
    #[serde(rename = "task", deserialize_with = "task_reference")]
    pub task_id: TaskId,
}

impl TaskEvent {
    pub fn new(kind: TaskEventKind, task_id: impl Into<TaskId>) -> Self {
        Self {
            kind,
            task_id: task_id.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskReference {
    Id(TaskId),
    Object { id: TaskId },
}

fn task_reference<'de, D: Deserializer<'de>>(d: D) -> Result<TaskId, D::Error> {
    Ok(match TaskReference::deserialize(d)? {
        TaskReference::Id(id) | TaskReference::Object { id } => id,
    })
}
