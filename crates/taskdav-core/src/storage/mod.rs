mod config;
pub mod state;

pub use config::{Credentials, SyncConfig, MIN_REQUEST_SPACING_MS};
pub use state::{Mapping, PersistedState, StateStore, SyncContext};

use std::path::PathBuf;

/// Returns `~/.config/taskdav[-dev]/` based on TASKDAV_ENV.
///
/// Set TASKDAV_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TASKDAV_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("taskdav-dev")
    } else {
        base_dir.join("taskdav")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
