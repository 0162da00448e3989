//! Synchronization engine and offline status check

mod check;
mod engine;

pub use check::{CheckReport, CheckStatus, EntryCheck, check_local};
pub use engine::{SyncEngine, SyncOutcome};
