//! Sync subcommand: sweeps, single-task reconciliation and host events.

use clap::Subcommand;
use std::io::Read;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use taskdav_core::{ItemOutcome, TaskEvent, TaskEventKind, TaskId};

use crate::common::{open_reconciler, CliResult, Paths};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Reconcile every task in the inventory
    All,
    /// Reconcile a single task
    Task {
        /// Task id
        id: String,
        /// Lifecycle event to treat the run as (updated, deleted, completed)
        #[arg(long, default_value = "updated", value_parser = parse_kind)]
        event: TaskEventKind,
    },
    /// Handle a host task event given as JSON
    Event {
        /// Event JSON, e.g. {"kind":"deleted","task":"42"}; read from stdin when omitted
        json: Option<String>,
    },
    /// Sweep repeatedly until interrupted
    Watch {
        /// Minutes between sweeps (default: sweep_interval_minutes from config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

pub async fn run(action: SyncAction, paths: &Paths) -> CliResult {
    match action {
        SyncAction::All => sync_all(paths).await,
        SyncAction::Task { id, event } => sync_task(paths, TaskId::new(id), event).await,
        SyncAction::Event { json } => sync_event(paths, json).await,
        SyncAction::Watch { interval } => watch(paths, interval).await,
    }
}

fn parse_kind(value: &str) -> Result<TaskEventKind, String> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| format!("unknown event kind: {value} (expected updated, deleted or completed)"))
}

fn describe(outcome: &ItemOutcome) -> String {
    match outcome {
        ItemOutcome::Pushed(resource) => format!("pushed {resource}"),
        ItemOutcome::Removed(resource) => format!("removed {resource}"),
        ItemOutcome::Ignored => "left unchanged".to_string(),
    }
}

async fn sync_all(paths: &Paths) -> CliResult {
    let mut reconciler = open_reconciler(paths)?;
    if !reconciler.remote().is_enabled() {
        println!("remote sync is disabled; only the local mapping is updated");
    }

    let summary = reconciler.sweep().await?;
    if summary.has_failures() {
        let failed = summary.failed + summary.orphan_failures;
        return Err(format!("{failed} calendar request(s) failed").into());
    }
    Ok(())
}

async fn sync_task(paths: &Paths, id: TaskId, kind: TaskEventKind) -> CliResult {
    let mut reconciler = open_reconciler(paths)?;
    let outcome = reconciler.process_task(&id, kind).await?;
    println!("{id}: {}", describe(&outcome));
    Ok(())
}

async fn sync_event(paths: &Paths, json: Option<String>) -> CliResult {
    let raw = match json {
        Some(raw) => raw,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let event: TaskEvent = serde_json::from_str(raw.trim())?;
    let task_id = event.task_id.clone();

    let mut reconciler = open_reconciler(paths)?;
    match reconciler.handle_event(event).await {
        Some(outcome) => println!("{task_id}: {}", describe(&outcome)),
        None => println!("{task_id}: no change applied"),
    }
    Ok(())
}

async fn watch(paths: &Paths, interval: Option<u64>) -> CliResult {
    let mut reconciler = open_reconciler(paths)?;
    let every = match interval {
        Some(minutes) => Duration::from_secs(minutes.max(1).saturating_mul(60)),
        None => reconciler.config().sweep_interval(),
    };

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = every.as_secs(), "watching for changes");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = reconciler.sweep().await {
                    warn!(error = %err, "sweep aborted");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                break;
            }
        }
    }
    Ok(())
}
