//! Wiring shared by the subcommands.

use std::error::Error;
use std::path::PathBuf;

use taskdav_core::storage::data_dir;
use taskdav_core::{
    CalDavClient, JsonFileInventory, Notifier, Reconciler, Severity, StateStore, SyncConfig,
    SyncContext,
};

pub type CliResult = Result<(), Box<dyn Error>>;

pub type CliReconciler = Reconciler<CalDavClient, JsonFileInventory, ConsoleNotifier>;

/// File locations given on the command line, falling back to the data dir.
pub struct Paths {
    pub state: Option<PathBuf>,
    pub tasks: Option<PathBuf>,
}

impl Paths {
    pub fn state_store(&self) -> Result<StateStore, Box<dyn Error>> {
        match &self.state {
            Some(path) => Ok(StateStore::new(path)),
            None => Ok(StateStore::default_location()?),
        }
    }

    pub fn inventory(&self) -> Result<JsonFileInventory, Box<dyn Error>> {
        match &self.tasks {
            Some(path) => Ok(JsonFileInventory::new(path)),
            None => Ok(JsonFileInventory::new(data_dir()?.join("tasks.json"))),
        }
    }
}

/// Prints notifications to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => println!("{message}"),
            Severity::Warning => println!("warning: {message}"),
            Severity::Error => eprintln!("error: {message}"),
        }
    }
}

/// Reconciler talking to the configured calendar.
pub fn open_reconciler(paths: &Paths) -> Result<CliReconciler, Box<dyn Error>> {
    let context = SyncContext::open(paths.state_store()?);
    let remote = CalDavClient::new(context.config())?;
    Ok(Reconciler::new(
        remote,
        paths.inventory()?,
        ConsoleNotifier,
        context,
    ))
}

/// Reconciler for local administration.
///
/// The client starts disabled so a broken stored config can still be
/// inspected and repaired; `replace_config` points it at the new endpoint.
pub fn open_admin(paths: &Paths) -> Result<CliReconciler, Box<dyn Error>> {
    let context = SyncContext::open(paths.state_store()?);
    let remote = CalDavClient::new(&SyncConfig::default())?;
    Ok(Reconciler::new(
        remote,
        paths.inventory()?,
        ConsoleNotifier,
        context,
    ))
}
