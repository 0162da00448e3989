//! fwsync CLI
//!
//! Pre-build synchronization of firmware template files, plus the
//! maintenance and check commands used by template authors.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync { root, config, json } => {
            let root = commands::resolve_root(&root);
            commands::run_sync(&root, config.as_deref(), json)
        }
        Commands::UpdateManifest { root, manifest } => {
            let root = commands::resolve_root(&root);
            commands::run_update_manifest(&root, manifest.as_deref())
        }
        Commands::Check { root, config, json } => {
            let root = commands::resolve_root(&root);
            commands::run_check(&root, config.as_deref(), json)
        }
    }
}
