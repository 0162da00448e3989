//! Sync configuration
//!
//! All tuning knobs are fixed when the project is configured, not passed on
//! every build. Defaults are compiled in; a project may override them in
//! `scripts/fwsync.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fwsync_fs::{ConfigStore, NormalizedPath, PathGuard, ProjectPath};
use serde::{Deserialize, Serialize};

use crate::transport::RetryPolicy;
use crate::{Error, Result};

/// Environment variable that forces developer mode on.
pub const DEVELOPER_MODE_ENV: &str = "FWSYNC_DEVELOPER_MODE";

/// Raw location of the published template files.
pub const DEFAULT_BASE_URL: &str =
    "https://code.osu.edu/fehelectronics/eed_controller/erc2-template/-/raw/main/";

/// Immutable settings for one sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Prefix joined with each manifest path to form its download URL
    pub base_url: String,
    /// Manifest location, relative to `base_url` and to the project root
    pub manifest_path: String,
    /// Directory, relative to the project root, that files are installed into
    pub dest_root: PathBuf,
    /// Manifest paths starting with any of these are never written
    pub disallowed_prefixes: Vec<String>,
    /// Per-attempt connect and read timeout
    pub timeout_secs: f64,
    /// Extra attempts after the first failed request
    pub retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub backoff_base_ms: u64,
    /// Continue the build with local files when the manifest is unreachable
    pub fail_open_manifest: bool,
    /// Continue with the remaining entries when one file fails
    pub fail_open_files: bool,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub use_system_proxy: bool,
    /// Skip all network activity; for working against a local library checkout
    pub developer_mode: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            manifest_path: ProjectPath::Manifest.as_str().to_string(),
            dest_root: PathBuf::from("."),
            disallowed_prefixes: vec![
                ProjectPath::PioDir.as_str().to_string(),
                ProjectPath::SrcDir.as_str().to_string(),
            ],
            timeout_secs: 3.0,
            retries: 2,
            backoff_base_ms: 250,
            fail_open_manifest: true,
            fail_open_files: true,
            accept_invalid_certs: true,
            use_system_proxy: true,
            developer_mode: false,
        }
    }
}

/// On-disk shape: the config itself plus the combined `fail_open` switch.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    fail_open: Option<bool>,
    #[serde(flatten)]
    config: SyncConfig,
}

impl SyncConfig {
    /// Load and validate a config file (TOML, JSON or YAML by extension).
    ///
    /// A top-level `fail_open` key sets both `fail_open_manifest` and
    /// `fail_open_files`; the specific keys win when both are present.
    pub fn load(path: &Path) -> Result<Self> {
        let store = ConfigStore::new();
        let raw: ConfigFile = store.load(path)?;
        let mut config = raw.config;
        if let Some(fail_open) = raw.fail_open {
            let keys: serde_json::Value = store.load(path)?;
            if keys.get("fail_open_manifest").is_none() {
                config.fail_open_manifest = fail_open;
            }
            if keys.get("fail_open_files").is_none() {
                config.fail_open_files = fail_open;
            }
        }
        config.validate()
    }

    /// Config for a project: `explicit` if given, else
    /// `<root>/scripts/fwsync.toml` if present, else the defaults.
    pub fn load_for_root(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let project_file = root.join(ProjectPath::ConfigFile.as_str());
        if project_file.is_file() {
            tracing::debug!(path = %project_file.display(), "loading project config");
            Self::load(&project_file)
        } else {
            Self::default().validate()
        }
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(DEVELOPER_MODE_ENV)
            && is_truthy(&value)
        {
            self.developer_mode = true;
        }
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Check ranges and normalize the base URL.
    pub fn validate(mut self) -> Result<Self> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "base_url must not be empty".into(),
            });
        }
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(Error::InvalidConfig {
                message: format!("timeout_secs must be positive, got {}", self.timeout_secs),
            });
        }
        if Duration::try_from_secs_f64(self.timeout_secs).is_err() {
            return Err(Error::InvalidConfig {
                message: format!("timeout_secs is out of range, got {}", self.timeout_secs),
            });
        }
        self.base_url = self.base_url.trim().to_string();
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(self.backoff_base_ms))
    }

    pub fn path_guard(&self) -> PathGuard {
        PathGuard::new(&self.disallowed_prefixes)
    }

    pub fn manifest_url(&self) -> String {
        format!("{}{}", self.base_url, NormalizedPath::new(&self.manifest_path))
    }

    /// Download URL for an already validated manifest path.
    pub fn file_url(&self, path: &NormalizedPath) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
