//! Sync passes over real HTTP against a loopback server.

use std::time::Duration;

use fwsync_core::{Error, HttpTransport, SyncConfig, SyncEngine, SyncOutcome};
use fwsync_fs::FixedRoot;
use fwsync_fs::checksum::{HexCase, digest_bytes};
use fwsync_test_utils::http::Reply;
use fwsync_test_utils::{CannedServer, RecordingSleeper, TestProject, manifest_json};
use pretty_assertions::assert_eq;

const INI: &[u8] = b"[env:teensy41]\n";
const BOARD: &[u8] = b"#pragma once\n";

fn engine(
    project: &TestProject,
    base_url: &str,
    tweak: impl FnOnce(&mut SyncConfig),
) -> (SyncEngine, RecordingSleeper) {
    let mut config = SyncConfig {
        base_url: base_url.to_string(),
        use_system_proxy: false,
        ..SyncConfig::default()
    };
    tweak(&mut config);
    let config = config.validate().unwrap();
    let sleeper = RecordingSleeper::new();
    let transport = HttpTransport::new(&config)
        .unwrap()
        .with_sleeper(sleeper.clone());
    let engine = SyncEngine::new(config, Box::new(transport))
        .with_root_resolver(FixedRoot::new(project.root()));
    (engine, sleeper)
}

fn two_file_manifest() -> Vec<u8> {
    let ini = digest_bytes(INI, HexCase::Upper);
    let board = digest_bytes(BOARD, HexCase::Lower);
    manifest_json(&[
        ("platformio.ini", ini.as_str()),
        ("lib/board.h", board.as_str()),
    ])
}

#[test]
fn test_downloads_every_stale_file_in_manifest_order() {
    let project = TestProject::new();
    let server = CannedServer::start(vec![
        Reply::ok(two_file_manifest()),
        Reply::ok(INI),
        Reply::ok(BOARD),
    ]);
    let (engine, sleeper) = engine(&project, server.base_url(), |_| {});

    let outcome = engine.sync().unwrap();

    assert_eq!(outcome.updated, 2);
    assert_eq!(project.read("platformio.ini"), INI);
    assert_eq!(project.read("lib/board.h"), BOARD);
    assert!(sleeper.delays().is_empty());
    assert_eq!(
        server.join(),
        vec![
            "GET /scripts/manifest.json HTTP/1.1".to_string(),
            "GET /platformio.ini HTTP/1.1".to_string(),
            "GET /lib/board.h HTTP/1.1".to_string(),
        ]
    );
}

#[test]
fn test_current_files_are_not_downloaded() {
    let project = TestProject::new();
    project.write("platformio.ini", INI);
    let server = CannedServer::start(vec![Reply::ok(two_file_manifest()), Reply::ok(BOARD)]);
    let (engine, _) = engine(&project, server.base_url(), |_| {});

    let outcome = engine.sync().unwrap();

    assert_eq!(outcome.updated, 1);
    assert_eq!(server.join().len(), 2);
}

#[test]
fn test_transient_file_error_is_retried() {
    let project = TestProject::new();
    project.write("lib/board.h", BOARD);
    let server = CannedServer::start(vec![
        Reply::ok(two_file_manifest()),
        Reply::status(502),
        Reply::ok(INI),
    ]);
    let (engine, sleeper) = engine(&project, server.base_url(), |_| {});

    let outcome = engine.sync().unwrap();

    assert_eq!(outcome.updated, 1);
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(250)]);
    assert_eq!(project.read("platformio.ini"), INI);
}

#[test]
fn test_exhausted_manifest_retries_fail_open() {
    let project = TestProject::new();
    let server = CannedServer::start(vec![
        Reply::status(503),
        Reply::status(503),
        Reply::status(503),
    ]);
    let (engine, sleeper) = engine(&project, server.base_url(), |_| {});

    let outcome = engine.sync().unwrap();

    assert_eq!(outcome, SyncOutcome::default());
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(250), Duration::from_millis(500)]
    );
    assert_eq!(server.join().len(), 3);
}

#[test]
fn test_exhausted_manifest_retries_fail_closed() {
    let project = TestProject::new();
    let server = CannedServer::start(vec![Reply::status(404)]);
    let (engine, _) = engine(&project, server.base_url(), |config| {
        config.retries = 0;
        config.fail_open_manifest = false;
    });

    let result = engine.sync();

    assert!(matches!(result, Err(Error::Transport(_))), "{result:?}");
}

#[test]
fn test_body_with_wrong_content_is_still_installed() {
    // Digests decide whether to download; the payload is installed as served.
    let project = TestProject::new();
    let ini = digest_bytes(INI, HexCase::Lower);
    let manifest = manifest_json(&[("platformio.ini", ini.as_str())]);
    let server = CannedServer::start(vec![
        Reply::ok(manifest.clone()),
        Reply::ok("[env:other]\n"),
        Reply::ok(manifest),
        Reply::ok(INI),
    ]);
    let (engine, _) = engine(&project, server.base_url(), |_| {});

    assert_eq!(engine.sync().unwrap().updated, 1);
    assert_eq!(project.read("platformio.ini"), b"[env:other]\n");

    assert_eq!(engine.sync().unwrap().updated, 1);
    assert_eq!(project.read("platformio.ini"), INI);
    assert_eq!(server.join().len(), 4);
}
