//! Metadata phase: static description plus discovered custom fields

use super::{PhaseWorker, WorkerContext};
use crate::engine::{DoneReport, WorkerOutcome};
use crate::error::Result;
use crate::normalize::ExternalSyncUnit;
use crate::schema::{
    discover_custom_fields, CustomField, ExternalDomainMetadata, OrganizationInfo,
};
use crate::state::{Phase, PhaseState};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const ISSUES_RECORD_TYPE: &str = "sentry_issues";

#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataWorker;

impl MetadataWorker {
    /// Sample one issue of the first selected grouping
    async fn discover(
        ctx: &WorkerContext,
        unit: &ExternalSyncUnit,
    ) -> Result<BTreeMap<String, CustomField>> {
        let query_key = ctx.query_key(unit).await?;
        let page = ctx.client.list_issues(&query_key, None).await?;

        let Some(sample) = page.items.first() else {
            debug!("Project {query_key} has no issues to sample");
            return Ok(BTreeMap::new());
        };
        Ok(discover_custom_fields(sample))
    }

    async fn extract(ctx: &WorkerContext, progress: PhaseState) -> Result<WorkerOutcome> {
        let mut metadata = ExternalDomainMetadata::load_static()?;
        let mut discovered = 0;

        if let Some(first) = ctx.selected.first() {
            match ctx.deadline.run(Self::discover(ctx, first)).await {
                None => {
                    warn!("Deadline reached during custom field discovery");
                    return Ok(WorkerOutcome::Progress(progress.with_progress(0, None)));
                }
                Some(Ok(fields)) => {
                    discovered = metadata.add_custom_fields(ISSUES_RECORD_TYPE, fields);
                    info!("Discovered {discovered} custom fields");
                }
                Some(Err(e)) => {
                    warn!("Could not fetch dynamic field info, using static metadata only: {e}");
                }
            }
        }

        let metadata = metadata.with_organization(OrganizationInfo {
            slug: ctx.client.org_slug().to_string(),
            fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            projects_count: ctx.selected.len(),
        });

        ctx.repository.push_metadata(&metadata).await?;
        Ok(WorkerOutcome::Done(DoneReport::Metadata {
            custom_fields: discovered,
        }))
    }
}

#[async_trait]
impl PhaseWorker for MetadataWorker {
    fn phase(&self) -> Phase {
        Phase::Metadata
    }

    async fn run(&self, ctx: &WorkerContext, progress: PhaseState) -> WorkerOutcome {
        Self::extract(ctx, progress)
            .await
            .unwrap_or_else(|e| WorkerOutcome::Error(format!("failed to extract metadata: {e}")))
    }
}
