//! Atomic file installation

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// Sibling temp path used while `target` is being replaced.
///
/// The pattern is `.{file_name}.{pid}.tmp`: hidden, in the same directory
/// (so the final rename never crosses filesystems) and unique per process.
pub fn temp_path_for(target: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    target.with_file_name(temp_name)
}

/// Write content atomically to a file.
///
/// Writes to a locked temp sibling, flushes it to disk and renames it over
/// the target. Readers of `path` observe either the old content or the new
/// content, never a partial write. Missing parent directories are created.
/// If anything fails the temp file is removed and the target is untouched.
pub fn write_atomic(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let target = path.as_ref();

    if target.is_dir() {
        return Err(Error::InvalidTarget {
            path: target.to_path_buf(),
            reason: "target is a directory".into(),
        });
    }

    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(target);
    let result = write_temp(&temp_path, target, content)
        .and_then(|()| fs::rename(&temp_path, target).map_err(|e| Error::io(target, e)));

    if result.is_err()
        && let Err(e) = fs::remove_file(&temp_path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::debug!(path = %temp_path.display(), error = %e, "could not remove temp file");
    }
    result
}

fn write_temp(temp_path: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/project/include/drivetrain.h"));
        assert_eq!(temp.parent(), Some(Path::new("/project/include")));
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".drivetrain.h."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn refuses_directory_target() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_atomic(dir.path(), b"data").unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
    }
}
