//! Manifest path safety checks
//!
//! A manifest is remote input. Every entry goes through two gates before
//! anything is written:
//!
//! 1. [`PathGuard::check`] inspects the relative path lexically: no empty
//!    paths, no absolute or drive-qualified paths, no `..` components and
//!    nothing under a blocklisted prefix.
//! 2. [`ensure_contained`] runs after the path is joined onto the project
//!    root and verifies, with symlinks in existing ancestors resolved, that
//!    the target is still inside the root.

use std::path::{Component, Path, PathBuf};

use crate::NormalizedPath;

/// Reason a manifest path was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathViolation {
    #[error("path is empty")]
    Empty,

    #[error("absolute path: {path}")]
    Absolute { path: String },

    #[error("parent traversal in path: {path}")]
    Traversal { path: String },

    #[error("path {path} is under protected prefix {prefix}")]
    Blocklisted { path: String, prefix: String },

    #[error("path escapes project root: {path}")]
    EscapesRoot { path: PathBuf },
}

/// Lexical validator for relative manifest paths.
#[derive(Debug, Clone)]
pub struct PathGuard {
    disallowed_prefixes: Vec<String>,
}

impl PathGuard {
    /// Create a guard refusing any path that starts with one of `prefixes`.
    ///
    /// Prefixes are normalized the same way as candidate paths and matched
    /// as case-insensitive string prefixes, so `src` also refuses `SRC/x`
    /// and `src2/x`.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let disallowed_prefixes = prefixes
            .into_iter()
            .map(|p| NormalizedPath::new(p.as_ref()).as_str().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            disallowed_prefixes,
        }
    }

    /// The normalized blocklist.
    pub fn disallowed_prefixes(&self) -> &[String] {
        &self.disallowed_prefixes
    }

    /// Validate `relative` and return its normalized form.
    pub fn check(&self, relative: &str) -> Result<NormalizedPath, PathViolation> {
        let path = NormalizedPath::new(relative);

        if path.is_empty() {
            return Err(PathViolation::Empty);
        }
        if path.is_absolute() {
            return Err(PathViolation::Absolute {
                path: path.to_string(),
            });
        }
        if path.components().any(is_traversal_component) {
            return Err(PathViolation::Traversal {
                path: path.to_string(),
            });
        }

        let lowered = path.as_str().to_ascii_lowercase();
        if let Some(prefix) = self
            .disallowed_prefixes
            .iter()
            .find(|prefix| lowered.starts_with(prefix.as_str()))
        {
            return Err(PathViolation::Blocklisted {
                path: path.to_string(),
                prefix: prefix.clone(),
            });
        }

        Ok(path)
    }

    /// Boolean form of [`PathGuard::check`].
    pub fn is_safe(&self, relative: &str) -> bool {
        self.check(relative).is_ok()
    }
}

/// `..`, including percent-encoded spellings that a web server would decode.
fn is_traversal_component(segment: &str) -> bool {
    segment == ".." || segment.to_ascii_lowercase().replace("%2e", ".") == ".."
}

/// Verify that `candidate` resolves to a location under `root`.
///
/// `root` must already be canonical. The deepest existing ancestor of
/// `candidate` is canonicalized (following symlinks) and the remaining,
/// not-yet-existing components are appended lexically; a `..` among those
/// remaining components is treated as an escape.
pub fn ensure_contained(root: &Path, candidate: &Path) -> Result<PathBuf, PathViolation> {
    let escape = || PathViolation::EscapesRoot {
        path: candidate.to_path_buf(),
    };

    let mut existing = candidate;
    let mut pending = Vec::new();
    let resolved_base = loop {
        if existing.exists() || existing.symlink_metadata().is_ok() {
            match dunce::canonicalize(existing) {
                Ok(resolved) => break resolved,
                // Dangling symlink: its target is unknown, refuse it.
                Err(_) => return Err(escape()),
            }
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                pending.push(name.to_os_string());
                existing = parent;
            }
            _ => return Err(escape()),
        }
    };

    let mut resolved = resolved_base;
    for name in pending.iter().rev() {
        let component = Path::new(name);
        if component
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(escape());
        }
        resolved.push(component);
    }

    if resolved.starts_with(root) && resolved != root {
        Ok(resolved)
    } else {
        Err(escape())
    }
}
