use clap::Subcommand;

use taskdav_core::TaskId;

use crate::common::{open_admin, CliResult, Paths};

#[derive(Subcommand)]
pub enum MappingAction {
    /// List task → resource entries
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop one entry without touching the calendar
    Forget {
        /// Task id
        id: String,
    },
    /// Drop every entry without touching the calendar
    Clear,
}

pub fn run(action: MappingAction, paths: &Paths) -> CliResult {
    match action {
        MappingAction::List { json } => {
            let reconciler = open_admin(paths)?;
            let mapping = reconciler.context().mapping();
            if json {
                println!("{}", serde_json::to_string_pretty(mapping)?);
            } else if mapping.is_empty() {
                println!("no mapped tasks");
            } else {
                for (task_id, resource_id) in mapping.all() {
                    println!("{task_id}\t{resource_id}");
                }
            }
        }
        MappingAction::Forget { id } => {
            let mut reconciler = open_admin(paths)?;
            match reconciler.forget(&TaskId::new(id.as_str()))? {
                Some(resource_id) => println!("forgot {id} ({resource_id})"),
                None => {
                    eprintln!("no mapping for task: {id}");
                    std::process::exit(1);
                }
            }
        }
        MappingAction::Clear => {
            let mut reconciler = open_admin(paths)?;
            let removed = reconciler.clear_mapping()?;
            println!("cleared {removed} mapping entries");
        }
    }
    Ok(())
}
