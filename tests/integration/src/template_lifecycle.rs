//! Template author and student project over several releases.
//!
//! The author keeps the manifest current with `update_manifest`; the
//! published tree is served from memory; the student project syncs and
//! is checked offline afterwards.

use fwsync_core::{SyncConfig, SyncEngine, SyncOutcome, check_local, update_manifest};
use fwsync_fs::FixedRoot;
use fwsync_test_utils::{FakeTransport, TestProject};
use pretty_assertions::assert_eq;

const BASE: &str = "http://template.test/raw/";
const MANIFEST: &str = "scripts/manifest.json";
const TEMPLATE_FILES: [&str; 3] = ["platformio.ini", "scripts/pre_build.py", "lib/board/board.h"];

struct Template {
    author: TestProject,
    remote: FakeTransport,
}

impl Template {
    fn new() -> Self {
        let author = TestProject::new();
        author.write("platformio.ini", b"[env:teensy41]\nplatform = teensy\n");
        author.write("scripts/pre_build.py", b"Import(\"env\")\n");
        author.write("lib/board/board.h", b"#pragma once\n#define LED 13\n");
        author.write("src/main.cpp", b"// template stub\n");
        author.write_manifest(
            br##"{
    "files": [
        { "path": "platformio.ini", "sha256": "" },
        { "path": "scripts/pre_build.py", "sha256": "" },
        { "path": "lib/board/board.h", "sha256": "" },
        { "path": "src/main.cpp", "sha256": "" },
        { "path": "#scripts/experimental.py", "sha256": "" }
    ]
}
"##,
        );
        let template = Self {
            author,
            remote: FakeTransport::new(BASE),
        };
        template.release();
        template
    }

    /// Refresh the manifest and publish the author's tree.
    fn release(&self) {
        update_manifest(self.author.root(), &self.author.path(MANIFEST)).unwrap();
        for path in TEMPLATE_FILES.iter().chain(["src/main.cpp"].iter()) {
            self.remote.serve(path, &self.author.read(path));
        }
        self.remote.set_raw_manifest(&self.author.read(MANIFEST));
    }

    fn sync(&self, student: &TestProject) -> SyncOutcome {
        let config = SyncConfig {
            base_url: BASE.to_string(),
            ..SyncConfig::default()
        };
        SyncEngine::new(config, Box::new(self.remote.clone()))
            .with_root_resolver(FixedRoot::new(student.root()))
            .sync()
            .unwrap()
    }
}

fn student_project() -> TestProject {
    let student = TestProject::new();
    student.write("src/main.cpp", b"// drive the robot\n");
    student
}

#[test]
fn test_first_sync_installs_template_and_spares_student_code() {
    let template = Template::new();
    let student = student_project();

    let outcome = template.sync(&student);

    assert_eq!(
        outcome,
        SyncOutcome {
            updated: 3,
            skipped: 1,
            failed: 0
        }
    );
    for path in TEMPLATE_FILES {
        assert_eq!(student.read(path), template.author.read(path), "{path}");
    }
    assert_eq!(student.read("src/main.cpp"), b"// drive the robot\n");
    assert!(!template.remote.was_requested("src/main.cpp"));
}

#[test]
fn test_new_release_updates_only_changed_file() {
    let template = Template::new();
    let student = student_project();
    template.sync(&student);

    template
        .author
        .write("lib/board/board.h", b"#pragma once\n#define LED 14\n");
    template.release();
    template.remote.clear_requests();

    let outcome = template.sync(&student);

    assert_eq!(outcome.updated, 1);
    assert_eq!(
        student.read("lib/board/board.h"),
        b"#pragma once\n#define LED 14\n"
    );
    assert_eq!(
        template.remote.requests(),
        vec![
            format!("{BASE}{MANIFEST}"),
            format!("{BASE}lib/board/board.h"),
        ]
    );
}

#[test]
fn test_windows_checkout_of_template_is_current() {
    let template = Template::new();
    let student = student_project();
    student.write("platformio.ini", b"[env:teensy41]\r\nplatform = teensy\r\n");

    template.sync(&student);

    assert!(!template.remote.was_requested("platformio.ini"));
    assert_eq!(
        student.read("platformio.ini"),
        b"[env:teensy41]\r\nplatform = teensy\r\n"
    );
}

#[test]
fn test_offline_check_is_healthy_after_sync() {
    let template = Template::new();
    let student = student_project();
    template.sync(&student);
    student.write_manifest(&template.author.read(MANIFEST));

    let config = SyncConfig {
        // Student code is expected to differ from the template stub.
        disallowed_prefixes: vec![".pio".into()],
        ..SyncConfig::default()
    };
    let report = check_local(student.root(), &config).unwrap();

    assert_eq!(report.current(), 3);
    assert_eq!(report.pending(), 1);

    let report = check_local(student.root(), &SyncConfig::default()).unwrap();
    assert_eq!(report.current(), 3);
    assert_eq!(report.unsafe_entries(), 1);
}

#[test]
fn test_update_manifest_is_stable_without_changes() {
    let template = Template::new();
    let before = template.author.read(MANIFEST);

    let report = update_manifest(template.author.root(), &template.author.path(MANIFEST)).unwrap();

    assert!(!report.written);
    assert_eq!(template.author.read(MANIFEST), before);
    let document: serde_json::Value = serde_json::from_slice(&before).unwrap();
    assert_eq!(document["files"][4]["sha256"], "");
}
