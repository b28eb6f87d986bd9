use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "taskdav", version, about = "Push scheduled tasks to a CalDAV calendar")]
struct Cli {
    /// State file holding sync config and the task mapping
    #[arg(long, global = true, env = "TASKDAV_STATE")]
    state: Option<PathBuf>,
    /// JSON task export read as the task inventory
    #[arg(long, global = true, env = "TASKDAV_TASKS")]
    tasks: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile tasks with the remote calendar
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Inspect or edit the task → resource mapping
    Mapping {
        #[command(subcommand)]
        action: commands::mapping::MappingAction,
    },
    /// Sync configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TASKDAV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let paths = common::Paths {
        state: cli.state,
        tasks: cli.tasks,
    };

    let result = match cli.command {
        Commands::Sync { action } => commands::sync::run(action, &paths).await,
        Commands::Mapping { action } => commands::mapping::run(action, &paths),
        Commands::Config { action } => commands::config::run(action, &paths),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
