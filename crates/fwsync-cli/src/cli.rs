//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// fwsync - Keep a firmware project's template files in step with upstream
#[derive(Parser, Debug)]
#[command(name = "fwsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Project location shared by every command.
#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct RootArgs {
    /// Project root (default: parent of the `scripts/` directory holding
    /// this executable, else the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Download stale or missing template files
    ///
    /// Run before each build. Never fails the build on network problems
    /// unless fail-open is disabled in the config.
    Sync {
        #[command(flatten)]
        root: RootArgs,

        /// Config file (default: scripts/fwsync.toml under the root)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute manifest digests from the working tree
    UpdateManifest {
        #[command(flatten)]
        root: RootArgs,

        /// Manifest to rewrite (default: scripts/manifest.json under the root)
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },

    /// Compare the project against the local manifest without network access
    Check {
        #[command(flatten)]
        root: RootArgs,

        /// Config file (default: scripts/fwsync.toml under the root)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
