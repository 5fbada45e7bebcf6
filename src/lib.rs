//! # Sentry Extractor
//!
//! Resumable extraction of Sentry projects, issues and organization members
//! into canonical items.
//!
//! ## Features
//!
//! - **Phase State Machine**: sync units, metadata, data and attachments,
//!   each resumable from a persisted cursor
//! - **Rate-Limit Aware Transport**: honors `Retry-After` and reset headers,
//!   falls back to exponential backoff
//! - **Link Header Pagination**: bounded page loops per project
//! - **Canonical Items**: normalized, validated and sanitized before hand-off
//! - **Reverse Sync**: issue updates and notes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sentry_extractor::engine::{EventType, Extractor, InboundEvent};
//! use sentry_extractor::repository::InMemoryRepository;
//! use sentry_extractor::{ConnectionContext, ExtractorConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let extractor = Extractor::new(ExtractorConfig::default(), Arc::new(InMemoryRepository::new()));
//!
//!     let event = InboundEvent::new(
//!         EventType::ExternalSyncUnitsStart,
//!         ConnectionContext::new("sntrys_...", "acme"),
//!     );
//!     let signal = extractor.handle(event).await;
//!
//!     // Persist `signal.state` and send the next phase's event
//!     println!("{}", signal.event_type);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Extractor::handle(event) → Signal               │
//! │      sync-units → metadata → data → attachments (one per call)  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Workers  │   HTTP    │   Paginate    │ Normalize │ Repository  │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Deadline │ Retry     │ Link header   │ Validate  │ In-memory   │
//! │ Progress │ Throttle  │ Page cap      │ Sanitize  │ JSON lines  │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the extractor
pub mod error;

/// Common types and type aliases
pub mod types;

/// Extractor configuration
pub mod config;

/// Sentry API client with retry and throttling
pub mod http;

/// Link header cursors and page caps
pub mod pagination;

/// Raw Sentry payloads
pub mod records;

/// Canonical items, validation and sanitization
pub mod normalize;

/// External domain metadata and custom field discovery
pub mod schema;

/// Extraction state and checkpointing
pub mod state;

/// Destinations for extracted items
pub mod repository;

/// Phase state machine
pub mod engine;

/// Phase workers
pub mod workers;

/// Reverse sync into Sentry
pub mod loading;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ExtractorConfig;
pub use engine::{Extractor, InboundEvent, Signal};
pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
