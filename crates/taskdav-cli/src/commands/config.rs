use clap::Subcommand;
use std::path::PathBuf;

use taskdav_core::SyncConfig;

use crate::common::{open_admin, CliResult, Paths};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "remote_base_url", "credentials.username")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Show the whole config (password redacted)
    Show,
    /// Replace the config with the contents of a TOML file
    Import {
        /// Path to the TOML file
        path: PathBuf,
    },
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction, paths: &Paths) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let reconciler = open_admin(paths)?;
            match reconciler.config().get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut reconciler = open_admin(paths)?;
            let config = reconciler.config().with_value(&key, &value)?;
            reconciler.replace_config(config)?;
            println!("ok");
        }
        ConfigAction::Show => {
            let reconciler = open_admin(paths)?;
            let json = serde_json::to_string_pretty(&reconciler.config().to_redacted_json())?;
            println!("{json}");
        }
        ConfigAction::Import { path } => {
            let config = SyncConfig::from_toml_file(&path)?;
            let mut reconciler = open_admin(paths)?;
            reconciler.replace_config(config)?;
            println!("config imported from {}", path.display());
        }
        ConfigAction::Reset => {
            let mut reconciler = open_admin(paths)?;
            reconciler.replace_config(SyncConfig::default())?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
