//! Manifest maintenance command

use std::path::Path;

use colored::Colorize;
use fwsync_core::update_manifest;
use fwsync_fs::ProjectPath;

use crate::error::Result;

/// Refresh digests in `manifest` (default `scripts/manifest.json` under
/// `root`).
pub fn run_update_manifest(root: &Path, manifest: Option<&Path>) -> Result<()> {
    let manifest_file = match manifest {
        Some(path) => path.to_path_buf(),
        None => root.join(ProjectPath::Manifest),
    };

    let report = update_manifest(root, &manifest_file)?;

    for path in &report.updated {
        println!("   {} {}", "~".yellow(), path);
    }
    for path in &report.missing {
        println!("   {} {} (not found)", "?".red(), path);
    }
    if report.written {
        println!(
            "{} {} digest(s) updated in {}",
            "OK".green().bold(),
            report.updated.len(),
            manifest_file.display()
        );
    } else {
        println!("{} Manifest already up to date.", "OK".green().bold());
    }
    Ok(())
}
