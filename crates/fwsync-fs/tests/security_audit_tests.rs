//! Path safety audit
//!
//! Manifests are remote input; these cases cover the ways a hostile or
//! buggy manifest could try to write outside the project or into
//! student-owned directories.

use fwsync_fs::{PathGuard, PathViolation, ensure_contained};
use rstest::rstest;

fn template_guard() -> PathGuard {
    PathGuard::new([".pio", "src"])
}

#[rstest]
#[case("../etc/passwd")]
#[case("../../home/user/.ssh/authorized_keys")]
#[case("include/../../outside.h")]
#[case("include\\..\\..\\outside.h")]
#[case("scripts/..")]
#[case("/etc/passwd")]
#[case("\\\\server\\share\\x")]
#[case("C:/Windows/System32/drivers/etc/hosts")]
#[case("d:relative-on-drive")]
#[case("src/main.cpp")]
#[case("./src/drivetrain.cpp")]
#[case("src\\drivechain.cpp")]
#[case(".pio/libdeps/teensy41/ERC2/library.json")]
#[case(".\\.pio\\build\\firmware.hex")]
#[case("")]
#[case("./")]
fn test_unsafe_manifest_paths_are_rejected(#[case] input: &str) {
    assert!(
        !template_guard().is_safe(input),
        "expected {input:?} to be rejected"
    );
}

#[rstest]
#[case("platformio.ini", "platformio.ini")]
#[case("./platformio.ini", "platformio.ini")]
#[case("scripts\\bootstrap.py", "scripts/bootstrap.py")]
#[case("include/drivetrain.h", "include/drivetrain.h")]
#[case("lib//README", "lib/README")]
#[case(".gitignore", ".gitignore")]
fn test_safe_manifest_paths_normalize(#[case] input: &str, #[case] expected: &str) {
    let path = template_guard().check(input).unwrap();
    assert_eq!(path.as_str(), expected);
}

#[test]
fn test_violation_messages_name_the_path() {
    let err = template_guard().check("../etc/passwd").unwrap_err();
    assert!(err.to_string().contains("../etc/passwd"), "got: {err}");

    let err = template_guard().check("src/main.cpp").unwrap_err();
    assert!(err.to_string().contains("src"), "got: {err}");
}

#[cfg(all(test, not(windows)))]
mod containment {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_symlinked_file_pointing_outside_is_refused() {
        let outside = TempDir::new().unwrap();
        let secret = outside.path().join("secret.txt");
        fs::write(&secret, "do not touch").unwrap();

        let jail = TempDir::new().unwrap();
        let root = dunce::canonicalize(jail.path()).unwrap();
        std::os::unix::fs::symlink(&secret, root.join("platformio.ini")).unwrap();

        let result = ensure_contained(&root, &root.join("platformio.ini"));
        assert!(matches!(result, Err(PathViolation::EscapesRoot { .. })));
    }

    #[test]
    fn test_dangling_symlink_is_refused() {
        let jail = TempDir::new().unwrap();
        let root = dunce::canonicalize(jail.path()).unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", root.join("platformio.ini")).unwrap();

        let result = ensure_contained(&root, &root.join("platformio.ini"));
        assert!(result.is_err());
    }

    #[test]
    fn test_symlink_staying_inside_root_is_allowed() {
        let jail = TempDir::new().unwrap();
        let root = dunce::canonicalize(jail.path()).unwrap();
        fs::create_dir(root.join("real")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

        let resolved = ensure_contained(&root, &root.join("alias").join("file.h")).unwrap();
        assert_eq!(resolved, root.join("real").join("file.h"));
    }
}
