//! CLI module
//!
//! Command-line host for the extractor.
//!
//! # Commands
//!
//! - `extract` - Run one invocation from an event file or stdin
//! - `check` - Test a token against an organization
//! - `load` - Apply one reverse-sync request
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig};
