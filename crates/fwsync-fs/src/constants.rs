//! Well-known locations inside a firmware template project.

use std::path::Path;

/// Standard project paths, relative to the project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPath {
    /// The `scripts` directory holding the build helpers
    ScriptsDir,
    /// The published manifest (`scripts/manifest.json`)
    Manifest,
    /// Optional sync configuration (`scripts/fwsync.toml`)
    ConfigFile,
    /// PlatformIO build artifacts
    PioDir,
    /// Student-owned sources
    SrcDir,
}

impl ProjectPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScriptsDir => "scripts",
            Self::Manifest => "scripts/manifest.json",
            Self::ConfigFile => "scripts/fwsync.toml",
            Self::PioDir => ".pio",
            Self::SrcDir => "src",
        }
    }
}

impl AsRef<Path> for ProjectPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
