//! Manifest-driven file synchronization for firmware project templates
//!
//! Before each build, the template's authoritative files are compared
//! against a published manifest of `(path, sha256)` pairs and any stale or
//! missing file is downloaded and installed atomically. Student sources
//! and build artifacts are never touched, and an offline machine simply
//! builds with what it already has.
//!
//! # Architecture
//!
//! ```text
//!                  fwsync-cli
//!                      |
//!                 fwsync-core
//!   SyncEngine -> manifest -> transport
//!                      |
//!                  fwsync-fs
//!   PathGuard, checksum, io::write_atomic, RootResolver
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fwsync_core::{HttpTransport, SyncConfig, SyncEngine};
//!
//! fn example() -> fwsync_core::Result<()> {
//!     let config = SyncConfig::default();
//!     let transport = HttpTransport::new(&config)?;
//!     let outcome = SyncEngine::new(config, Box::new(transport)).sync()?;
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod maintenance;
pub mod manifest;
pub mod sync;
pub mod transport;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use maintenance::{ManifestUpdateReport, update_manifest};
pub use manifest::{ManifestEntry, ManifestParseError, ParsedManifest};
pub use sync::{CheckReport, CheckStatus, EntryCheck, SyncEngine, SyncOutcome, check_local};
pub use transport::{
    HttpTransport, RetryPolicy, Sleeper, ThreadSleeper, Transport, TransportError,
    retry_with_backoff,
};
