//! Task snapshots as delivered by the host task inventory.
//!
//! Tasks are owned by the host; this crate only reads them. The JSON shape
//! uses camelCase keys so host exports can be fed in unchanged.

pub mod event;
pub mod inventory;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use event::{TaskEvent, TaskEventKind};
pub use inventory::{JsonFileInventory, TaskInventory};

/// Length of a timed event when the task carries no estimate.
pub const DEFAULT_EVENT_MINUTES: i64 = 60;

/// Stable task identifier assigned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A schedulable item.
///
/// A task is "timed" when it has `scheduled_at` or `due_at`, and "all-day"
/// when only `due_date_only` is set. Tasks with neither never reach the
/// calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date_only: Option<NaiveDate>,
    /// Milliseconds on the wire. Zero means "no estimate".
    #[serde(default, alias = "timeEstimate", with = "duration_ms")]
    pub estimated_duration: Option<Duration>,
}

impl Task {
    /// Create an open, unscheduled task.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            notes: None,
            is_done: false,
            scheduled_at: None,
            due_at: None,
            due_date_only: None,
            estimated_duration: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn scheduled(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn due(mut self, at: DateTime<Utc>) -> Self {
        self.due_at = Some(at);
        self
    }

    pub fn due_on(mut self, day: NaiveDate) -> Self {
        self.due_date_only = Some(day);
        self
    }

    pub fn estimated(mut self, duration: Duration) -> Self {
        self.estimated_duration = Some(duration);
        self
    }

    pub fn done(mut self) -> Self {
        self.is_done = true;
        self
    }

    /// Whether any of the three timing fields is present.
    pub fn has_timing(&self) -> bool {
        self.scheduled_at.is_some() || self.due_at.is_some() || self.due_date_only.is_some()
    }

    /// Start of a timed event: the scheduled slot wins over the deadline.
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at.or(self.due_at)
    }

    pub fn duration_or_default(&self) -> Duration {
        self.estimated_duration
            .filter(|d| *d > Duration::zero())
            .unwrap_or_else(|| Duration::minutes(DEFAULT_EVENT_MINUTES))
    }
}

mod duration_ms {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.num_milliseconds()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let ms = Option::<i64>::deserialize(d)?;
        Ok(ms.filter(|ms| *ms > 0).map(Duration::milliseconds))
    }
}
