//! Project root resolution
//!
//! The sync entry point ships inside the template's `scripts/` directory,
//! so the project root is normally the parent of the directory holding the
//! running program. When that layout does not hold, the current working
//! directory is used instead.

use std::path::{Path, PathBuf};

use crate::ProjectPath;

/// Strategy for locating the project root.
pub trait RootResolver {
    /// Best-effort root directory. Never fails; implementations fall back
    /// to something sensible instead.
    fn resolve(&self) -> PathBuf;
}

/// A root chosen up front (command-line override, tests).
#[derive(Debug, Clone)]
pub struct FixedRoot(PathBuf);

impl FixedRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }
}

impl RootResolver for FixedRoot {
    fn resolve(&self) -> PathBuf {
        self.0.clone()
    }
}

/// Derive the root from the location of the running program.
#[derive(Debug, Clone, Default)]
pub struct ScriptRelativeRoot {
    program: Option<PathBuf>,
    fallback: Option<PathBuf>,
}

impl ScriptRelativeRoot {
    /// Resolve relative to `program`, typically `<root>/scripts/fwsync`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
            fallback: None,
        }
    }

    /// Resolve relative to the current executable.
    pub fn from_current_exe() -> Self {
        Self {
            program: std::env::current_exe().ok(),
            fallback: None,
        }
    }

    /// Use `dir` instead of the working directory when the program is not
    /// inside a `scripts` directory.
    pub fn with_fallback(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback = Some(dir.into());
        self
    }

    fn from_program(program: &Path) -> Option<PathBuf> {
        let program = dunce::canonicalize(program).unwrap_or_else(|_| program.to_path_buf());
        let scripts_dir = program.parent()?;
        if scripts_dir.file_name()? == ProjectPath::ScriptsDir.as_str() {
            scripts_dir.parent().map(Path::to_path_buf)
        } else {
            None
        }
    }

    fn fallback_dir(&self) -> PathBuf {
        let dir = match &self.fallback {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        dunce::canonicalize(&dir).unwrap_or(dir)
    }
}

impl RootResolver for ScriptRelativeRoot {
    fn resolve(&self) -> PathBuf {
        if let Some(root) = self.program.as_deref().and_then(Self::from_program) {
            tracing::debug!(root = %root.display(), "project root derived from program location");
            return root;
        }
        let root = self.fallback_dir();
        tracing::debug!(root = %root.display(), "project root falls back to working directory");
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_root_is_returned_verbatim() {
        let resolver = FixedRoot::new("/work/erc2");
        assert_eq!(resolver.resolve(), PathBuf::from("/work/erc2"));
    }

    #[test]
    fn program_inside_scripts_resolves_to_grandparent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        std::fs::create_dir(root.join("scripts")).unwrap();
        let program = root.join("scripts").join("fwsync");
        std::fs::write(&program, b"").unwrap();

        let resolver = ScriptRelativeRoot::new(&program).with_fallback("/elsewhere");
        assert_eq!(resolver.resolve(), root);
    }

    #[test]
    fn program_elsewhere_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dunce::canonicalize(dir.path()).unwrap();

        let resolver = ScriptRelativeRoot::new("/usr/local/bin/fwsync").with_fallback(&fallback);
        assert_eq!(resolver.resolve(), fallback);
    }

    #[test]
    fn missing_program_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dunce::canonicalize(dir.path()).unwrap();

        let resolver = ScriptRelativeRoot::default().with_fallback(&fallback);
        assert_eq!(resolver.resolve(), fallback);
    }
}
