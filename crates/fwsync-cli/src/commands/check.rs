//! Offline check command
//!
//! Reads the manifest copy shipped with the project and reports what the
//! next sync would do. Exits nonzero when anything is pending or unsafe so
//! it can gate CI.

use std::path::Path;

use colored::Colorize;
use fwsync_core::{CheckReport, CheckStatus, SyncConfig, check_local};

use crate::error::{CliError, Result};

/// Run the check command against `root`.
pub fn run_check(root: &Path, config_file: Option<&Path>, json: bool) -> Result<()> {
    let config = SyncConfig::load_for_root(root, config_file)?;
    let report = check_local(root, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.is_healthy() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} file(s) out of date, {} unsafe manifest entr{}",
            report.pending(),
            report.unsafe_entries(),
            if report.unsafe_entries() == 1 { "y" } else { "ies" }
        )))
    }
}

fn print_report(report: &CheckReport) {
    println!("{} Checking project against local manifest...", "=>".blue().bold());

    if let Some(error) = &report.manifest_error {
        println!("{} {}", "MANIFEST".red().bold(), error);
    }

    for entry in &report.entries {
        match &entry.status {
            CheckStatus::Current => {}
            CheckStatus::Stale => println!("   {} {}", "~".yellow(), entry.path),
            CheckStatus::Missing => println!("   {} {}", "+".green(), entry.path),
            CheckStatus::Unsafe { reason } => {
                println!("   {} {} ({})", "!".red(), entry.path, reason)
            }
        }
    }

    if report.is_healthy() {
        println!(
            "{} {} file(s) current.",
            "OK".green().bold(),
            report.current()
        );
    }
}
