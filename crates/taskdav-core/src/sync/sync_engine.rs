//! Reconciler: keeps the remote calendar in line with the task inventory.
//!
//! Two entry points share the same per-task logic:
//! - [`Reconciler::handle_event`] for single task lifecycle events
//! - [`Reconciler::sweep`] for full passes over the inventory
//!
//! Every remote mutation is followed by a mapping update that is persisted
//! before the next task is looked at.

use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::PersistenceError;
use crate::notify::{Notifier, Severity};
use crate::storage::{SyncConfig, SyncContext};
use crate::sync::calendar_client::RemoteStore;
use crate::sync::event_codec::encode;
use crate::sync::policy::classify;
use crate::sync::types::{ItemOutcome, ResourceId, SweepSummary, SyncDecision, SyncError};
use crate::task::{Task, TaskEvent, TaskEventKind, TaskId, TaskInventory};

/// Keeps a minimum gap between consecutive remote requests.
struct Pacer {
    spacing: Duration,
    last: Option<Instant>,
}

impl Pacer {
    fn new(spacing: Duration) -> Self {
        Self { spacing, last: None }
    }

    /// A pacer that never waits, for sweeps that make no remote requests.
    fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    async fn wait(&mut self) {
        if self.spacing.is_zero() {
            return;
        }
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.spacing).await;
        }
        self.last = Some(Instant::now());
    }
}

/// Orchestrates policy, codec, remote store and mapping.
pub struct Reconciler<R, I, N> {
    remote: R,
    inventory: I,
    notifier: N,
    context: SyncContext,
}

impl<R, I, N> Reconciler<R, I, N>
where
    R: RemoteStore,
    I: TaskInventory,
    N: Notifier,
{
    pub fn new(remote: R, inventory: I, notifier: N, context: SyncContext) -> Self {
        Self {
            remote,
            inventory,
            notifier,
            context,
        }
    }

    pub fn context(&self) -> &SyncContext {
        &self.context
    }

    pub fn config(&self) -> &SyncConfig {
        self.context.config()
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut I {
        &mut self.inventory
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Replace the configuration wholesale and persist it.
    ///
    /// The remote store is reconfigured first; if persisting then fails it
    /// is pointed back at the previous config.
    pub fn replace_config(&mut self, config: SyncConfig) -> Result<(), SyncError> {
        config.validate()?;
        self.remote.reconfigure(&config)?;
        if let Err(err) = self.context.replace_config(config) {
            if let Err(rollback) = self.remote.reconfigure(self.context.config()) {
                warn!(error = %rollback, "could not restore remote client to the previous config");
            }
            return Err(err.into());
        }
        info!(enabled = self.config().enabled, "sync configuration replaced");
        Ok(())
    }

    /// Host entry point for a task lifecycle event.
    ///
    /// Never fails: unknown tasks are logged and skipped, every other
    /// failure becomes a notification and leaves the mapping untouched.
    pub async fn handle_event(&mut self, event: TaskEvent) -> Option<ItemOutcome> {
        match self.process_task(&event.task_id, event.kind).await {
            Ok(outcome) => Some(outcome),
            Err(SyncError::TaskNotFound(id)) => {
                warn!(task_id = %id, kind = ?event.kind, "event for unknown task ignored");
                None
            }
            Err(err) => {
                self.notifier.notify(
                    &format!("Calendar sync failed for task {}: {err}", event.task_id),
                    Severity::Error,
                );
                None
            }
        }
    }

    /// Reconcile one task from a fresh inventory snapshot.
    ///
    /// A `Deleted` event for a task the inventory no longer has takes the
    /// delete path; other kinds report [`SyncError::TaskNotFound`].
    pub async fn process_task(
        &mut self,
        id: &TaskId,
        kind: TaskEventKind,
    ) -> Result<ItemOutcome, SyncError> {
        match self.inventory.find_by_id(id)? {
            Some(task) => self.apply(&task).await,
            None if kind == TaskEventKind::Deleted => self.remove(id).await,
            None => Err(SyncError::TaskNotFound(id.clone())),
        }
    }

    async fn apply(&mut self, task: &Task) -> Result<ItemOutcome, SyncError> {
        match classify(task, self.context.config()) {
            SyncDecision::Sync => self.push(task).await,
            SyncDecision::Delete => self.remove(&task.id).await,
            SyncDecision::Ignore => {
                debug!(task_id = %task.id, "completed task left as is");
                Ok(ItemOutcome::Ignored)
            }
        }
    }

    async fn push(&mut self, task: &Task) -> Result<ItemOutcome, SyncError> {
        let event = encode(task, Utc::now())?;
        self.remote
            .upsert(&event.resource_id, &event.to_document())
            .await?;
        info!(task_id = %task.id, resource_id = %event.resource_id, "pushed task event");

        let saved = self
            .context
            .put_mapping(task.id.clone(), event.resource_id.clone());
        self.check_saved(&task.id, saved)?;
        Ok(ItemOutcome::Pushed(event.resource_id))
    }

    async fn remove(&mut self, id: &TaskId) -> Result<ItemOutcome, SyncError> {
        let resource = self
            .context
            .mapping()
            .get(id)
            .cloned()
            .unwrap_or_else(|| ResourceId::for_task(id));
        self.remote.delete(&resource).await?;
        info!(task_id = %id, resource_id = %resource, "removed task event");

        let saved = self.context.remove_mapping(id).map(|_| ());
        self.check_saved(id, saved)?;
        Ok(ItemOutcome::Removed(resource))
    }

    fn check_saved(
        &self,
        id: &TaskId,
        saved: Result<(), PersistenceError>,
    ) -> Result<(), SyncError> {
        saved.map_err(|err| {
            error!(
                task_id = %id,
                error = %err,
                "remote calendar changed but mapping was not saved; remote and local state diverge until the next sweep"
            );
            SyncError::from(err)
        })
    }

    /// Full reconciliation pass over the inventory.
    ///
    /// Mapped tasks that still exist but no longer classify as `Sync` are
    /// deleted first, then every syncable task is pushed. Mapped ids missing
    /// from the inventory are never touched here. Requests are sequential
    /// and spaced by the configured request spacing while sync is enabled.
    /// One item's failure never stops the others; the outcome is reported
    /// once at the end.
    pub async fn sweep(&mut self) -> Result<SweepSummary, SyncError> {
        let tasks = match self.inventory.list() {
            Ok(tasks) => tasks,
            Err(err) => {
                self.notifier
                    .notify(&format!("Calendar sync could not read tasks: {err}"), Severity::Error);
                return Err(err.into());
            }
        };
        let config = self.context.config().clone();
        let mut pacer = if config.enabled {
            Pacer::new(config.request_spacing())
        } else {
            Pacer::unpaced()
        };
        let mut summary = SweepSummary::default();

        let by_id: HashMap<&TaskId, &Task> = tasks.iter().map(|task| (&task.id, task)).collect();
        let orphans: Vec<TaskId> = self
            .context
            .mapping()
            .all()
            .filter(|(id, _)| match by_id.get(id) {
                Some(task) => classify(task, &config) != SyncDecision::Sync,
                None => {
                    debug!(task_id = %id, "mapped task missing from inventory; left for its delete event");
                    false
                }
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &orphans {
            pacer.wait().await;
            match self.remove(id).await {
                Ok(_) => summary.orphans_removed += 1,
                Err(err) => {
                    warn!(task_id = %id, error = %err, "orphan cleanup failed");
                    summary.orphan_failures += 1;
                }
            }
        }

        let syncable = tasks
            .iter()
            .filter(|task| classify(task, &config) == SyncDecision::Sync);
        for task in syncable {
            pacer.wait().await;
            match self.push(task).await {
                Ok(_) => summary.synced += 1,
                Err(err) => {
                    warn!(task_id = %task.id, error = %err, "task sync failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            synced = summary.synced,
            failed = summary.failed,
            orphans_removed = summary.orphans_removed,
            orphan_failures = summary.orphan_failures,
            "sweep finished"
        );
        let severity = if summary.has_failures() {
            Severity::Warning
        } else {
            Severity::Info
        };
        self.notifier.notify(&summary.to_string(), severity);
        Ok(summary)
    }

    /// Drop a mapping entry without touching the remote calendar.
    pub fn forget(&mut self, id: &TaskId) -> Result<Option<ResourceId>, SyncError> {
        Ok(self.context.remove_mapping(id)?)
    }

    /// Drop every mapping entry without touching the remote calendar.
    pub fn clear_mapping(&mut self) -> Result<usize, SyncError> {
        Ok(self.context.clear_mapping()?)
    }
}
