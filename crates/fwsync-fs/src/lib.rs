//! Filesystem layer for fwsync
//!
//! Provides the pieces of the sync protocol that touch the local project
//! tree: manifest path validation, line-ending-insensitive content digests,
//! atomic file installation, project root resolution and config loading.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod guard;
pub mod io;
pub mod layout;
pub mod path;

pub use checksum::{HexCase, digest_of, digests_match};
pub use config::ConfigStore;
pub use constants::ProjectPath;
pub use error::{Error, Result};
pub use guard::{PathGuard, PathViolation, ensure_contained};
pub use layout::{FixedRoot, RootResolver, ScriptRelativeRoot};
pub use path::NormalizedPath;
