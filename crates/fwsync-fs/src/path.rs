//! Normalized relative path handling for manifest entries

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Manifest paths arrive with whatever separator the manifest author's
/// platform used. Normalization converts backslashes to forward slashes,
/// drops empty and `.` components (which also strips any leading `./`
/// marker) and keeps everything else verbatim, including `..` components
/// and a leading `/`, so that [`crate::PathGuard`] can still see them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let absolute = raw.starts_with('/');
        let body = raw
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");

        let inner = if absolute { format!("/{body}") } else { body };
        Self { inner }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        self.components().collect()
    }

    /// Iterate over the `/`-separated components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|segment| !segment.is_empty())
    }

    /// True when nothing is left after normalization.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// True for rooted paths (`/etc/passwd`) and drive-qualified paths
    /// (`C:/Windows`, `c:foo`).
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/') || self.has_drive_prefix()
    }

    /// True when any component is a parent-directory reference.
    pub fn has_parent_traversal(&self) -> bool {
        self.components().any(|segment| segment == "..")
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.components().last()
    }

    fn has_drive_prefix(&self) -> bool {
        let bytes = self.inner.as_bytes();
        bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslashes_become_forward_slashes() {
        let path = NormalizedPath::new("scripts\\bootstrap.py");
        assert_eq!(path.as_str(), "scripts/bootstrap.py");
    }

    #[test]
    fn leading_current_dir_markers_are_stripped() {
        assert_eq!(NormalizedPath::new("./platformio.ini").as_str(), "platformio.ini");
        assert_eq!(NormalizedPath::new("././a/b").as_str(), "a/b");
        assert_eq!(NormalizedPath::new(".\\a").as_str(), "a");
    }

    #[test]
    fn parent_components_are_preserved() {
        let path = NormalizedPath::new("a/../b");
        assert_eq!(path.as_str(), "a/../b");
        assert!(path.has_parent_traversal());
    }

    #[test]
    fn hidden_files_are_not_confused_with_markers() {
        let path = NormalizedPath::new(".pio/build/firmware.bin");
        assert_eq!(path.as_str(), ".pio/build/firmware.bin");
        assert!(!path.has_parent_traversal());
    }

    #[test]
    fn absolute_detection() {
        assert!(NormalizedPath::new("/etc/passwd").is_absolute());
        assert!(NormalizedPath::new("C:\\Windows\\win.ini").is_absolute());
        assert!(!NormalizedPath::new("include/drivetrain.h").is_absolute());
    }

    #[test]
    fn file_name_is_last_component() {
        let path = NormalizedPath::new("include/drivetrain.h");
        assert_eq!(path.file_name(), Some("drivetrain.h"));
        assert_eq!(NormalizedPath::new("").file_name(), None);
    }
}
