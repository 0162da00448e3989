//! Manifest maintenance
//!
//! Recomputes the digest of every listed file from the working tree and
//! rewrites the manifest when anything changed. Digests are written in
//! uppercase; the sync client compares case-insensitively. The document is
//! re-serialized with 4-space indentation and a trailing newline, and keys
//! keep their original order.

use std::path::Path;

use fwsync_fs::checksum::{self, HexCase};
use fwsync_fs::{NormalizedPath, io};
use serde::Serialize;
use serde_json::Value;

use crate::manifest::{COMMENT_MARKER, FILES_KEY, HASH_KEY, PATH_KEY};
use crate::{Error, Result};

/// What [`update_manifest`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestUpdateReport {
    /// Paths whose digest was rewritten
    pub updated: Vec<String>,
    /// Paths listed in the manifest but absent from the working tree
    pub missing: Vec<String>,
    /// Whether the manifest file was rewritten
    pub written: bool,
}

/// Refresh the digests in the manifest at `manifest_file` from files under
/// `root`.
///
/// Entries without a usable `path`, and commented-out entries, are left
/// untouched. The file is only rewritten when a digest changed.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or is not a JSON object
/// with a `files` list, or if a listed file exists but cannot be read.
pub fn update_manifest(root: &Path, manifest_file: &Path) -> Result<ManifestUpdateReport> {
    let text = io::read_text(manifest_file)?;
    let mut document: Value =
        serde_json::from_str(&text).map_err(|e| Error::ManifestInvalid {
            path: manifest_file.to_path_buf(),
            message: e.to_string(),
        })?;

    let files = document
        .get_mut(FILES_KEY)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| Error::ManifestInvalid {
            path: manifest_file.to_path_buf(),
            message: format!("missing \"{FILES_KEY}\" list"),
        })?;

    let mut report = ManifestUpdateReport::default();
    for entry in files.iter_mut() {
        let Some(object) = entry.as_object_mut() else {
            continue;
        };
        let Some(relative) = object
            .get(PATH_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.starts_with(COMMENT_MARKER))
            .map(str::to_string)
        else {
            continue;
        };

        let local = root.join(NormalizedPath::new(&relative).to_native());
        if !local.is_file() {
            tracing::warn!("file {} not found.", relative);
            report.missing.push(relative);
            continue;
        }

        let digest = checksum::digest_of_with_case(&local, HexCase::Upper).map_err(|source| {
            Error::LocalRead {
                path: local.clone(),
                source,
            }
        })?;
        if object.get(HASH_KEY).and_then(Value::as_str) != Some(digest.as_str()) {
            object.insert(HASH_KEY.to_string(), Value::String(digest));
            tracing::info!("Updated hash for {}", relative);
            report.updated.push(relative);
        }
    }

    if !report.updated.is_empty() {
        io::write_atomic(manifest_file, &to_manifest_json(&document)?)?;
        report.written = true;
        tracing::info!("{} updated.", manifest_file.display());
    }
    Ok(report)
}

/// Serialize with 4-space indentation and a trailing newline.
pub fn to_manifest_json(document: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}
