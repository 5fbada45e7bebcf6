//! Attachments phase
//!
//! Sentry issues carry no attachments the extractor can fetch, so the phase
//! completes immediately with nothing pushed.

use super::{PhaseWorker, WorkerContext};
use crate::engine::{DoneReport, WorkerOutcome};
use crate::state::{Phase, PhaseState};
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentsWorker;

#[async_trait]
impl PhaseWorker for AttachmentsWorker {
    fn phase(&self) -> Phase {
        Phase::Attachments
    }

    async fn run(&self, _ctx: &WorkerContext, _progress: PhaseState) -> WorkerOutcome {
        info!("No attachments to extract");
        WorkerOutcome::Done(DoneReport::Attachments { count: 0 })
    }
}
