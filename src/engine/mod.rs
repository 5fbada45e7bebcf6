//! Extraction engine
//!
//! Drives one invocation of the extraction state machine.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Extractor` - Runs the phase named by an inbound event and folds the
//!   worker's outcome back into the extraction state
//! - `InboundEvent` / `Signal` - The host-facing event contract
//! - `Deadline` - Cooperative per-invocation time limit
//!
//! Exactly one signal is produced per invocation. Phases are never skipped:
//! a request for a phase whose predecessors are not completed is answered
//! with that phase's error signal and the state is returned untouched.

mod deadline;
mod types;

pub use deadline::Deadline;
pub use types::{
    DoneReport, EventType, ExtractorEventType, InboundEvent, OutcomeKind, Signal, WorkerOutcome,
};

use crate::config::ExtractorConfig;
use crate::http::SentryClient;
use crate::repository::ItemRepository;
use crate::workers::{worker_for, WorkerContext};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Phase state machine over a repository
#[derive(Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    repository: Arc<dyn ItemRepository>,
}

impl Extractor {
    /// Create an extractor pushing into `repository`
    pub fn new(config: ExtractorConfig, repository: Arc<dyn ItemRepository>) -> Self {
        Self { config, repository }
    }

    /// Get the configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Handle one inbound event
    pub async fn handle(&self, event: InboundEvent) -> Signal {
        let phase = event.event_type.phase();
        let deadline = event.deadline();
        let mut state = event.state;

        if let Err(e) = state.ensure_can_run(phase) {
            warn!("Rejecting {}: {e}", event.event_type);
            return Signal::error(phase, e.to_string(), state);
        }

        let mut progress = state.phase(phase).clone();
        if event.event_type.is_continue() {
            if progress.completed {
                info!("Phase {phase} already completed");
                return Signal::from_outcome(
                    phase,
                    &WorkerOutcome::Done(DoneReport::empty(phase)),
                    state,
                );
            }
            progress.error = None;
        } else {
            progress.reset();
        }
        *state.phase_mut(phase) = progress.clone();

        let client = match SentryClient::new(&event.connection, &self.config) {
            Ok(client) => client,
            Err(e) => {
                error!("Cannot create API client: {e}");
                let message = format!("invalid connection: {e}");
                state.phase_mut(phase).mark_errored(message.clone());
                return Signal::error(phase, message, state);
            }
        };

        let ctx = WorkerContext {
            client,
            repository: Arc::clone(&self.repository),
            deadline,
            selected: event.external_sync_units,
        };

        info!(
            "Running {phase} for org {} ({} selected projects)",
            ctx.client.org_slug(),
            ctx.selected.len()
        );
        debug!("Resuming from {progress:?}");

        let start = Instant::now();
        let outcome = worker_for(phase).run(&ctx, progress).await;
        let elapsed = start.elapsed();

        let slot = state.phase_mut(phase);
        match &outcome {
            WorkerOutcome::Done(_) => {
                slot.mark_completed();
                info!("Phase {phase} done in {elapsed:?}");
            }
            WorkerOutcome::Progress(partial) => {
                *slot = partial.clone();
                info!("Phase {phase} interrupted by deadline after {elapsed:?}");
            }
            WorkerOutcome::Error(message) => {
                slot.mark_errored(message.clone());
                error!("Phase {phase} failed: {message}");
            }
        }

        Signal::from_outcome(phase, &outcome, state)
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
