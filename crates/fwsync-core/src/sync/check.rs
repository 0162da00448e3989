//! Offline status check
//!
//! Compares the project tree against the local copy of the manifest without
//! any network access. Useful for seeing what the next sync would download.

use std::path::Path;

use fwsync_fs::{NormalizedPath, checksum, ensure_contained};
use serde::{Deserialize, Serialize};

use crate::manifest;
use crate::{Error, Result, SyncConfig};

/// State of one manifest entry on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CheckStatus {
    /// Local digest matches the manifest
    Current,
    /// Local file differs from the manifest
    Stale,
    /// File does not exist locally
    Missing,
    /// Refused by the path checks; sync would skip it
    Unsafe { reason: String },
}

/// One manifest entry and its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCheck {
    pub path: String,
    #[serde(flatten)]
    pub status: CheckStatus,
}

/// Result of [`check_local`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckReport {
    pub entries: Vec<EntryCheck>,
    /// Document-level manifest problem, if any
    pub manifest_error: Option<String>,
}

impl CheckReport {
    fn count(&self, wanted: fn(&CheckStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| wanted(&e.status)).count()
    }

    pub fn current(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Current))
    }

    /// Entries the next sync would download.
    pub fn pending(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Stale | CheckStatus::Missing))
    }

    pub fn unsafe_entries(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Unsafe { .. }))
    }

    /// Nothing to download and nothing refused.
    pub fn is_healthy(&self) -> bool {
        self.manifest_error.is_none() && self.pending() == 0 && self.unsafe_entries() == 0
    }
}

/// Check `root` against the manifest stored at `root/<manifest_path>`.
///
/// # Errors
///
/// Returns an error if the manifest file cannot be read or a local file
/// exists but cannot be read.
pub fn check_local(root: &Path, config: &SyncConfig) -> Result<CheckReport> {
    let root = dunce::canonicalize(root).map_err(|e| fwsync_fs::Error::io(root, e))?;
    let manifest_file = root.join(NormalizedPath::new(&config.manifest_path).to_native());
    let payload =
        std::fs::read(&manifest_file).map_err(|e| fwsync_fs::Error::io(&manifest_file, e))?;

    let parsed = manifest::parse(&payload);
    let guard = config.path_guard();
    let dest = root.join(&config.dest_root);

    let mut report = CheckReport {
        manifest_error: parsed.error.as_ref().map(ToString::to_string),
        ..CheckReport::default()
    };

    for entry in parsed.entries {
        let located = guard
            .check(&entry.path)
            .and_then(|relative| ensure_contained(&root, &dest.join(relative.to_native())));

        let status = match located {
            Err(violation) => CheckStatus::Unsafe {
                reason: violation.to_string(),
            },
            Ok(local) if !local.exists() => CheckStatus::Missing,
            Ok(local) => {
                let digest = checksum::digest_of(&local).map_err(|source| Error::LocalRead {
                    path: local.clone(),
                    source,
                })?;
                if checksum::digests_match(&digest, &entry.sha256) {
                    CheckStatus::Current
                } else {
                    CheckStatus::Stale
                }
            }
        };

        report.entries.push(EntryCheck {
            path: entry.path,
            status,
        });
    }

    Ok(report)
}
