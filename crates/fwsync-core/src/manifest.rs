//! Manifest decoding
//!
//! The manifest is a JSON document:
//!
//! ```json
//! {
//!     "files": [
//!         { "path": "platformio.ini", "sha256": "9F86D0..." },
//!         { "path": "#scripts/disabled.py", "sha256": "..." }
//!     ]
//! }
//! ```
//!
//! Decoding never fails as a whole. Entries that are not objects, lack a
//! non-empty string `path` or `sha256`, or whose path starts with `#` are
//! dropped individually; a document that is not JSON or has no `files`
//! array yields no entries and a [`ManifestParseError`] for the caller to
//! log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level key holding the entry list.
pub const FILES_KEY: &str = "files";
/// Per-entry key holding the relative path.
pub const PATH_KEY: &str = "path";
/// Per-entry key holding the expected digest.
pub const HASH_KEY: &str = "sha256";
/// Paths starting with this marker are commented out.
pub const COMMENT_MARKER: char = '#';

/// One `(relative path, expected digest)` row of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Relative path with `/` separators, not yet validated
    pub path: String,
    /// Expected hex digest, any letter case
    pub sha256: String,
}

impl ManifestEntry {
    pub fn new(path: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sha256: sha256.into(),
        }
    }
}

/// Why a manifest document could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestParseError {
    #[error("manifest is not valid JSON: {message}")]
    Json { message: String },

    #[error("manifest has no \"files\" list")]
    MissingFiles,
}

/// Entries in manifest order plus the document-level error, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    pub entries: Vec<ManifestEntry>,
    pub error: Option<ManifestParseError>,
    /// Elements that were present but malformed
    pub rejected: usize,
}

impl ParsedManifest {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decode a manifest payload. The bytes are read as UTF-8, replacing
/// invalid sequences.
pub fn parse(payload: &[u8]) -> ParsedManifest {
    let text = String::from_utf8_lossy(payload);
    let document: Value = match serde_json::from_str(&text) {
        Ok(document) => document,
        Err(e) => {
            return ParsedManifest {
                error: Some(ManifestParseError::Json {
                    message: e.to_string(),
                }),
                ..ParsedManifest::default()
            };
        }
    };

    let Some(files) = document.get(FILES_KEY).and_then(Value::as_array) else {
        return ParsedManifest {
            error: Some(ManifestParseError::MissingFiles),
            ..ParsedManifest::default()
        };
    };

    let mut parsed = ParsedManifest::default();
    for element in files {
        match entry_from_value(element) {
            Some(Row::Entry(entry)) => parsed.entries.push(entry),
            Some(Row::Comment) => {}
            None => {
                tracing::debug!(element = %element, "ignoring malformed manifest entry");
                parsed.rejected += 1;
            }
        }
    }
    parsed
}

enum Row {
    Entry(ManifestEntry),
    Comment,
}

fn entry_from_value(element: &Value) -> Option<Row> {
    let object = element.as_object()?;
    let path = object.get(PATH_KEY)?.as_str()?.trim().replace('\\', "/");
    let sha256 = object.get(HASH_KEY)?.as_str()?.trim();

    if path.starts_with(COMMENT_MARKER) {
        return Some(Row::Comment);
    }
    if path.is_empty() || sha256.is_empty() {
        return None;
    }
    Some(Row::Entry(ManifestEntry::new(path, sha256)))
}
