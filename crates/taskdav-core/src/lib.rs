//! # taskdav Core Library
//!
//! Keeps a remote calendar collection in step with a host's task list.
//! Every scheduled task becomes one `.ics` resource; unscheduled or finished
//! tasks have their resource removed. The push is one-way and idempotent:
//! re-running a sweep after a partial failure converges on the right remote
//! state.
//!
//! ## Architecture
//!
//! - **Task**: read-only task snapshots and the host inventory seam
//! - **Sync**: classification policy, iCalendar codec, remote client and the
//!   reconciler that drives them
//! - **Storage**: configuration and the task → resource mapping, persisted
//!   together as one blob
//! - **Notify**: user-visible notification sink
//!
//! ## Key Components
//!
//! - [`Reconciler`]: single-event and full-sweep reconciliation
//! - [`SyncContext`]: injected config + mapping state
//! - [`CalDavClient`]: HTTP implementation of [`RemoteStore`]

pub mod error;
pub mod notify;
pub mod storage;
pub mod sync;
pub mod task;

pub use error::{ConfigError, InventoryError, PersistenceError};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use storage::{Credentials, Mapping, PersistedState, StateStore, SyncConfig, SyncContext};
pub use sync::{
    classify, encode, CalDavClient, ItemOutcome, Reconciler, RemoteError, RemoteStore, ResourceId,
    SweepSummary, SyncDecision, SyncError,
};
pub use task::{JsonFileInventory, Task, TaskEvent, TaskEventKind, TaskId, TaskInventory};
