//! Phase workers
//!
//! One worker per extraction phase. A worker receives the phase's stored
//! progress and returns a [`WorkerOutcome`]; it never touches the state of
//! other phases. Every network call is raced against the invocation deadline
//! so a worker can stop between calls and hand back resumable progress.

mod attachments;
mod data;
mod metadata;
mod sync_units;

pub use attachments::AttachmentsWorker;
pub use data::DataWorker;
pub use metadata::MetadataWorker;
pub use sync_units::SyncUnitsWorker;

use crate::engine::{Deadline, WorkerOutcome};
use crate::error::{Error, Result};
use crate::http::SentryClient;
use crate::normalize::ExternalSyncUnit;
use crate::repository::ItemRepository;
use crate::state::{Phase, PhaseState};
use async_trait::async_trait;
use std::sync::Arc;

/// Everything a worker needs for one invocation
#[derive(Clone)]
pub struct WorkerContext {
    pub client: SentryClient,
    pub repository: Arc<dyn ItemRepository>,
    pub deadline: Deadline,
    /// Groupings selected by the user, possibly empty
    pub selected: Vec<ExternalSyncUnit>,
}

impl WorkerContext {
    /// Query key of a grouping; looked up by id when not stored
    pub async fn query_key(&self, unit: &ExternalSyncUnit) -> Result<String> {
        if let Some(key) = unit.query_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }

        tracing::debug!("Resolving query key for grouping {}", unit.id);
        let project = self.client.get_project(&unit.id).await?;
        project
            .slug
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::invalid_event(format!("grouping '{}' has no slug", unit.id)))
    }
}

impl std::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("client", &self.client)
            .field("deadline", &self.deadline)
            .field("selected", &self.selected.len())
            .finish_non_exhaustive()
    }
}

/// Business logic of one phase
#[async_trait]
pub trait PhaseWorker: Send + Sync {
    /// Phase this worker implements
    fn phase(&self) -> Phase;

    /// Run from `progress` until done, failed, or out of time
    async fn run(&self, ctx: &WorkerContext, progress: PhaseState) -> WorkerOutcome;
}

/// Worker for a phase
pub fn worker_for(phase: Phase) -> Box<dyn PhaseWorker> {
    match phase {
        Phase::SyncUnits => Box::new(SyncUnitsWorker),
        Phase::Metadata => Box::new(MetadataWorker),
        Phase::Data => Box::new(DataWorker),
        Phase::Attachments => Box::new(AttachmentsWorker),
    }
}
