//! [`TestProject`] temporary firmware project for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary project directory laid out like the firmware template.
///
/// # Example
///
/// ```rust,no_run
/// use fwsync_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.write("src/main.cpp", b"int main() {}\n");
/// assert!(project.exists("src/main.cpp"));
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty project with a `scripts/` directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("scripts")).unwrap();
        Self { temp_dir }
    }

    /// Root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root with symlinks resolved, as the engine sees it.
    pub fn canonical_root(&self) -> PathBuf {
        fs::canonicalize(self.root()).unwrap()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, content: &[u8]) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        fs::read(self.path(relative))
            .unwrap_or_else(|e| panic!("TestProject::read: {relative}: {e}"))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Write `scripts/fwsync.toml`.
    pub fn write_config(&self, toml: &str) {
        self.write("scripts/fwsync.toml", toml.as_bytes());
    }

    /// Write `scripts/manifest.json`.
    pub fn write_manifest(&self, payload: &[u8]) {
        self.write("scripts/manifest.json", payload);
    }

    /// Names of leftover `.tmp` files anywhere under the root.
    pub fn temp_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, found: &mut Vec<PathBuf>) {
            let Ok(entries) = fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, found);
                } else if path.extension().is_some_and(|e| e == "tmp") {
                    found.push(path);
                }
            }
        }
        let mut found = Vec::new();
        walk(self.root(), &mut found);
        found
    }
}
