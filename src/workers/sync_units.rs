//! Sync-units phase: list the organization's projects

use super::{PhaseWorker, WorkerContext};
use crate::engine::{DoneReport, WorkerOutcome};
use crate::normalize::ExternalSyncUnit;
use crate::state::{Phase, PhaseState};
use async_trait::async_trait;
use tracing::{info, warn};

/// Reports every project with an id and a name as a sync unit
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncUnitsWorker;

#[async_trait]
impl PhaseWorker for SyncUnitsWorker {
    fn phase(&self) -> Phase {
        Phase::SyncUnits
    }

    async fn run(&self, ctx: &WorkerContext, progress: PhaseState) -> WorkerOutcome {
        let Some(result) = ctx.deadline.run(ctx.client.list_projects()).await else {
            warn!("Deadline reached before projects were listed");
            return WorkerOutcome::Progress(progress.with_progress(0, None));
        };

        let projects = match result {
            Ok(projects) => projects,
            Err(e) => return WorkerOutcome::Error(format!("failed to fetch projects: {e}")),
        };

        let total = projects.len();
        let units: Vec<_> = projects
            .iter()
            .map(ExternalSyncUnit::from_project)
            .filter(|unit| {
                let valid = unit.is_valid();
                if !valid {
                    warn!("Skipping project without id or name: {unit:?}");
                }
                valid
            })
            .collect();

        info!("Found {} valid projects out of {total}", units.len());
        WorkerOutcome::Done(DoneReport::SyncUnits(units))
    }
}
