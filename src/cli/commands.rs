//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sentry extractor CLI
#[derive(Parser, Debug)]
#[command(name = "sentry-extractor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Extractor configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one extraction invocation and print its signal
    Extract {
        /// Inbound event file (JSON); read from stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// State file; loaded before the run and replaced atomically after it
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Directory receiving one JSON-lines file per item bucket
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Deadline in seconds from now, used when the event carries none
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List the organization's projects to test credentials
    Check {
        /// Bearer token
        #[arg(long)]
        token: String,

        /// Organization slug
        #[arg(long)]
        org: String,
    },

    /// Apply one reverse-sync request and print its response
    Load {
        /// Load request file (JSON); read from stdin when omitted
        #[arg(short, long)]
        request: Option<PathBuf>,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Directory receiving extracted items
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
