//! Line-ending-insensitive SHA-256 digests
//!
//! Template files are edited on Windows and Unix machines alike. Before
//! hashing, every CRLF pair is collapsed to a single LF so that a checkout
//! with `core.autocrlf` enabled compares equal to the published content and
//! does not trigger a re-download on every build.

use std::borrow::Cow;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex digit casing for rendered digests.
///
/// The sync client renders lowercase; the manifest maintenance command
/// writes uppercase. Comparisons never depend on it, see [`digests_match`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HexCase {
    #[default]
    Lower,
    Upper,
}

/// Collapse every `\r\n` pair into `\n`, scanning left to right.
///
/// A lone `\r` is kept, so `\r\r\n` becomes `\r\n`.
pub fn normalize_line_endings(content: &[u8]) -> Cow<'_, [u8]> {
    if !content.windows(2).any(|w| w == b"\r\n") {
        return Cow::Borrowed(content);
    }

    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        if content[i] == b'\r' && content.get(i + 1) == Some(&b'\n') {
            out.push(b'\n');
            i += 2;
        } else {
            out.push(content[i]);
            i += 1;
        }
    }
    Cow::Owned(out)
}

/// Digest of in-memory content, after line-ending normalization.
pub fn digest_bytes(content: &[u8], case: HexCase) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_line_endings(content));
    let digest = hasher.finalize();
    match case {
        HexCase::Lower => format!("{:x}", digest),
        HexCase::Upper => format!("{:X}", digest),
    }
}

/// Lowercase digest of a file's normalized contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn digest_of(path: &Path) -> std::io::Result<String> {
    digest_of_with_case(path, HexCase::Lower)
}

/// Digest of a file's normalized contents in the requested casing.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn digest_of_with_case(path: &Path, case: HexCase) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(digest_bytes(&content, case))
}

/// Compare two hex digests ignoring letter case and surrounding whitespace.
pub fn digests_match(local: &str, expected: &str) -> bool {
    local.trim().eq_ignore_ascii_case(expected.trim())
}
