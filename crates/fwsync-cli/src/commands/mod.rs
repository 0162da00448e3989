//! Command implementations for fwsync-cli

pub mod check;
pub mod sync;
pub mod update_manifest;

pub use check::run_check;
pub use sync::run_sync;
pub use update_manifest::run_update_manifest;

use std::path::PathBuf;

use fwsync_fs::{RootResolver, ScriptRelativeRoot};

use crate::cli::RootArgs;

/// Project root: `--root` if given, else located from this executable.
pub fn resolve_root(args: &RootArgs) -> PathBuf {
    match &args.root {
        Some(root) => root.clone(),
        None => ScriptRelativeRoot::from_current_exe().resolve(),
    }
}
