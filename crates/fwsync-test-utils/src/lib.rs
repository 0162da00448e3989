//! Shared test utilities for the fwsync workspace.
//!
//! Test doubles and fixtures used across crate test suites. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`transport`]: in-memory [`FakeTransport`] and [`RecordingSleeper`]
//! - [`http`]: [`CannedServer`], a loopback HTTP server with scripted replies
//! - [`project`]: [`TestProject`] temporary firmware project

pub mod http;
pub mod project;
pub mod transport;

pub use http::CannedServer;
pub use project::TestProject;
pub use transport::{FakeTransport, RecordingSleeper, manifest_json};
