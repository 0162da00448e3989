//! Sync command implementation
//!
//! The pre-build entry point: load the project config, run one pass and
//! report the outcome.

use std::path::Path;

use fwsync_core::{HttpTransport, SyncConfig, SyncEngine};
use fwsync_fs::FixedRoot;

use crate::error::Result;

/// Run the sync command against `root`.
pub fn run_sync(root: &Path, config_file: Option<&Path>, json: bool) -> Result<()> {
    let config = SyncConfig::load_for_root(root, config_file)?.with_process_env();
    tracing::debug!(root = %root.display(), base_url = %config.base_url, "starting sync");

    let transport = HttpTransport::new(&config)?;
    let engine =
        SyncEngine::new(config, Box::new(transport)).with_root_resolver(FixedRoot::new(root));
    let outcome = engine.sync()?;

    if json {
        println!("{}", serde_json::to_string(&outcome)?);
    }
    Ok(())
}
