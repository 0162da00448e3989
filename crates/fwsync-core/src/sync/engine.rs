//! SyncEngine implementation
//!
//! One pass over the manifest: validate each path, compare the local digest
//! and download only what is stale. Entries are processed strictly in
//! order, one request and one write at a time.
//!
//! Two runs against the same project root must not overlap; the caller
//! (one build per checkout) is responsible for serializing them.

use std::fmt;
use std::path::Path;

use fwsync_fs::{NormalizedPath, PathGuard, RootResolver, ScriptRelativeRoot, checksum, io};
use serde::{Deserialize, Serialize};

use crate::manifest::{self, ManifestEntry};
use crate::transport::Transport;
use crate::{Error, Result, SyncConfig};

/// Counters for one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Files downloaded and installed
    pub updated: usize,
    /// Entries refused by the path checks
    pub skipped: usize,
    /// Entries whose download or install failed and were left as-is
    pub failed: usize,
}

impl SyncOutcome {
    /// True when the pass changed nothing and refused nothing.
    pub fn is_up_to_date(&self) -> bool {
        self.updated == 0 && self.skipped == 0 && self.failed == 0
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "updated={}, skipped={}", self.updated, self.skipped)?;
        if self.failed > 0 {
            write!(f, ", failed={}", self.failed)?;
        }
        Ok(())
    }
}

/// Engine for synchronizing template files with the published manifest.
pub struct SyncEngine {
    config: SyncConfig,
    guard: PathGuard,
    transport: Box<dyn Transport>,
    resolver: Box<dyn RootResolver>,
}

impl SyncEngine {
    /// Create an engine that locates the project root from the running
    /// program's location.
    pub fn new(config: SyncConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            guard: config.path_guard(),
            config,
            transport,
            resolver: Box::new(ScriptRelativeRoot::from_current_exe()),
        }
    }

    /// Replace the root resolution strategy.
    pub fn with_root_resolver(mut self, resolver: impl RootResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one synchronization pass.
    ///
    /// # Errors
    ///
    /// Returns an error only when a failure is not covered by the fail-open
    /// settings, or when the project root does not exist. Developer mode
    /// returns before the root is resolved.
    pub fn sync(&self) -> Result<SyncOutcome> {
        if self.config.developer_mode {
            tracing::info!("developer mode enabled, skipping sync.");
            return Ok(SyncOutcome::default());
        }

        let resolved = self.resolver.resolve();
        let root =
            dunce::canonicalize(&resolved).map_err(|e| fwsync_fs::Error::io(&resolved, e))?;
        let dest = root.join(&self.config.dest_root);

        let manifest_url = self.config.manifest_url();
        tracing::info!("checking updates via {}", manifest_url);

        let payload = match self.transport.fetch(&manifest_url) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("manifest download failed: {}", e);
                if self.config.fail_open_manifest {
                    tracing::info!("continuing with local files (offline mode).");
                    return Ok(SyncOutcome::default());
                }
                return Err(e.into());
            }
        };

        let parsed = manifest::parse(&payload);
        if let Some(error) = &parsed.error {
            tracing::warn!("manifest parse error: {}", error);
        }
        if parsed.is_empty() {
            tracing::info!("manifest empty; nothing to do.");
            return Ok(SyncOutcome::default());
        }

        let mut outcome = SyncOutcome::default();
        for entry in &parsed.entries {
            self.sync_entry(&root, &dest, entry, &mut outcome)?;
        }

        if outcome.is_up_to_date() {
            tracing::info!("already up to date.");
        } else {
            tracing::info!("done ({}).", outcome);
        }
        Ok(outcome)
    }

    fn sync_entry(
        &self,
        root: &Path,
        dest: &Path,
        entry: &ManifestEntry,
        outcome: &mut SyncOutcome,
    ) -> Result<()> {
        let relative = match self.guard.check(&entry.path) {
            Ok(relative) => relative,
            Err(violation) => {
                tracing::warn!("SKIP unsafe path in manifest: {}", violation);
                outcome.skipped += 1;
                return Ok(());
            }
        };

        let local = match fwsync_fs::ensure_contained(root, &dest.join(relative.to_native())) {
            Ok(local) => local,
            Err(violation) => {
                tracing::warn!("SKIP {}", violation);
                outcome.skipped += 1;
                return Ok(());
            }
        };

        match self.install_if_stale(&relative, &local, &entry.sha256) {
            Ok(false) => Ok(()),
            Ok(true) => {
                outcome.updated += 1;
                tracing::info!("Updated: {}", relative);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("FAILED to update {}: {}", relative, e);
                if self.config.fail_open_files {
                    outcome.failed += 1;
                    Ok(())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Download and install `relative` unless `local` already matches.
    /// Returns whether the file was replaced.
    fn install_if_stale(
        &self,
        relative: &NormalizedPath,
        local: &Path,
        expected: &str,
    ) -> Result<bool> {
        if local.exists() {
            let current = checksum::digest_of(local).map_err(|source| Error::LocalRead {
                path: local.to_path_buf(),
                source,
            })?;
            if checksum::digests_match(&current, expected) {
                tracing::debug!(path = %relative, "up to date");
                return Ok(false);
            }
            tracing::debug!(path = %relative, local = %current, expected, "digest mismatch");
        } else {
            tracing::debug!(path = %relative, "missing locally");
        }

        let data = self.transport.fetch(&self.config.file_url(relative))?;
        io::write_atomic(local, &data).map_err(|source| Error::Write {
            path: relative.to_string(),
            source,
        })?;
        Ok(true)
    }
}
