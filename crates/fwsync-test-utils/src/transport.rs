//! In-memory transport and sleeper doubles.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fwsync_core::{Sleeper, Transport, TransportError};
use fwsync_fs::checksum::{HexCase, digest_bytes};

/// Render a manifest document listing `entries` as `(path, sha256)` pairs.
pub fn manifest_json(entries: &[(&str, &str)]) -> Vec<u8> {
    let files: Vec<_> = entries
        .iter()
        .map(|(path, sha256)| serde_json::json!({ "path": path, "sha256": sha256 }))
        .collect();
    serde_json::to_vec_pretty(&serde_json::json!({ "files": files })).unwrap()
}

#[derive(Default)]
struct State {
    bodies: HashMap<String, Vec<u8>>,
    entries: Vec<(String, String)>,
    raw_manifest: Option<Vec<u8>>,
    failing: HashSet<String>,
    offline: bool,
    requests: Vec<String>,
}

/// A published template held in memory.
///
/// Clones share state, so a test can keep a handle after moving one into
/// the engine and inspect the request log afterwards.
///
/// # Example
///
/// ```rust,no_run
/// use fwsync_test_utils::FakeTransport;
///
/// let remote = FakeTransport::new("http://template.test/raw/");
/// remote.publish("platformio.ini", b"[env:teensy41]\n");
/// assert_eq!(remote.request_count(), 0);
/// ```
#[derive(Clone)]
pub struct FakeTransport {
    base_url: String,
    manifest_path: String,
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    /// Serve a template rooted at `base_url`; the manifest lives at
    /// `scripts/manifest.json`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            manifest_path: "scripts/manifest.json".to_string(),
            state: Arc::default(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn manifest_url(&self) -> String {
        self.url_for(&self.manifest_path)
    }

    /// Serve `content` at `path` and list it in the manifest with its
    /// lowercase digest. Publishing the same path again replaces both.
    pub fn publish(&self, path: &str, content: &[u8]) {
        let digest = digest_bytes(content, HexCase::Lower);
        let url = self.url_for(path);
        let mut state = self.state();
        state.bodies.insert(url, content.to_vec());
        match state.entries.iter_mut().find(|(p, _)| p == path) {
            Some(entry) => entry.1 = digest,
            None => state.entries.push((path.to_string(), digest)),
        }
    }

    /// List an entry in the manifest without serving any content for it.
    pub fn list(&self, path: &str, sha256: &str) {
        self.state()
            .entries
            .push((path.to_string(), sha256.to_string()));
    }

    /// Serve `content` at `path` without touching the manifest.
    pub fn serve(&self, path: &str, content: &[u8]) {
        let url = self.url_for(path);
        self.state().bodies.insert(url, content.to_vec());
    }

    /// Replace the rendered manifest with an arbitrary payload.
    pub fn set_raw_manifest(&self, payload: &[u8]) {
        self.state().raw_manifest = Some(payload.to_vec());
    }

    /// Make requests for `path` fail.
    pub fn fail(&self, path: &str) {
        let url = self.url_for(path);
        self.state().failing.insert(url);
    }

    /// Make every request fail, as on a machine without network.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    pub fn was_requested(&self, path: &str) -> bool {
        let url = self.url_for(path);
        self.state().requests.contains(&url)
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    fn render_manifest(state: &State) -> Vec<u8> {
        if let Some(raw) = &state.raw_manifest {
            return raw.clone();
        }
        let entries: Vec<(&str, &str)> = state
            .entries
            .iter()
            .map(|(p, h)| (p.as_str(), h.as_str()))
            .collect();
        manifest_json(&entries)
    }
}

impl Transport for FakeTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let manifest_url = self.manifest_url();
        let mut state = self.state();
        state.requests.push(url.to_string());

        let unavailable = |reason: &str| TransportError::Unavailable {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        if state.offline {
            return Err(unavailable("network is unreachable"));
        }
        if state.failing.contains(url) {
            return Err(unavailable("connection reset"));
        }
        if url == manifest_url {
            return Ok(Self::render_manifest(&state));
        }
        state
            .bodies
            .get(url)
            .cloned()
            .ok_or(TransportError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Records requested delays instead of sleeping.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
