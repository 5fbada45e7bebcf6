//! Data phase: issues per project, then organization members
//!
//! Progress is `(current_index, cursor)`. An index below the number of
//! groupings points at a project, an index equal to it points at the members
//! sub-step. Issues are pushed page by page, so a stored cursor always names
//! the first page not yet handed to the repository.

use super::{PhaseWorker, WorkerContext};
use crate::engine::{DoneReport, WorkerOutcome};
use crate::error::Result;
use crate::normalize::{finalize_batch, normalize_issue, normalize_user, ExternalSyncUnit};
use crate::pagination::{PageBudget, PaginationCursor};
use crate::records::{RecordContext, RecordKind};
use crate::state::{Phase, PhaseState};
use crate::types::ItemType;
use async_trait::async_trait;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct DataWorker;

/// How one grouping's page loop ended
enum GroupingEnd {
    /// Ran out of pages or hit the page cap
    Finished,
    /// Fetch failed; the grouping is skipped
    Skipped,
    /// Deadline reached; resume from this cursor
    Interrupted(Option<PaginationCursor>),
}

impl DataWorker {
    /// Groupings to extract: the selection, or every project when empty
    async fn groupings(ctx: &WorkerContext) -> Option<Result<Vec<ExternalSyncUnit>>> {
        if !ctx.selected.is_empty() {
            return Some(Ok(ctx.selected.clone()));
        }

        info!("No projects selected, extracting from all projects");
        let projects = ctx.deadline.run(ctx.client.list_projects()).await?;
        Some(projects.map(|projects| {
            projects
                .iter()
                .map(ExternalSyncUnit::from_project)
                .filter(ExternalSyncUnit::is_valid)
                .collect()
        }))
    }

    /// Fetch pages of one grouping until exhausted, capped, failed or out of time
    async fn extract_grouping(
        ctx: &WorkerContext,
        unit: &ExternalSyncUnit,
        query_key: &str,
        mut cursor: Option<PaginationCursor>,
        issues: &mut usize,
    ) -> Result<GroupingEnd> {
        let context = RecordContext {
            org_slug: ctx.client.org_slug().to_string(),
            project_id: Some(unit.id.clone()),
            project_slug: query_key.to_string(),
        };
        let mut budget = PageBudget::new(ctx.client.limits().max_pages_per_grouping);

        loop {
            if !budget.try_take() {
                info!(
                    "Reached page cap of {} for project {query_key}, remaining pages wait for the next run",
                    budget.fetched()
                );
                return Ok(GroupingEnd::Finished);
            }

            let fetched = ctx
                .deadline
                .run(ctx.client.list_issues(query_key, cursor.as_ref()))
                .await;
            let page = match fetched {
                None => return Ok(GroupingEnd::Interrupted(cursor)),
                Some(Ok(page)) => page,
                Some(Err(e)) => {
                    warn!("Failed to fetch issues for project {query_key}, skipping: {e}");
                    return Ok(GroupingEnd::Skipped);
                }
            };

            let items = page
                .items
                .into_iter()
                .map(|issue| normalize_issue(&issue.with_context(context.clone())));
            let batch = finalize_batch(RecordKind::Issue, items);
            *issues += ctx.repository.push(ItemType::SentryIssues, batch).await?;

            match page.next {
                Some(next) => cursor = Some(next),
                None => return Ok(GroupingEnd::Finished),
            }
        }
    }

    async fn extract(ctx: &WorkerContext, progress: PhaseState) -> Result<WorkerOutcome> {
        let start = progress.current_index.unwrap_or(0);
        let mut cursor = progress.cursor.clone();

        let groupings = match Self::groupings(ctx).await {
            None => return Ok(WorkerOutcome::Progress(progress.with_progress(start, cursor))),
            Some(groupings) => groupings?,
        };

        let (mut issues, mut users) = (0, 0);

        for (index, unit) in groupings.iter().enumerate().skip(start) {
            let query_key = match ctx.deadline.run(ctx.query_key(unit)).await {
                None => return Ok(WorkerOutcome::Progress(progress.with_progress(index, cursor))),
                Some(Ok(key)) => key,
                Some(Err(e)) => {
                    warn!("Cannot resolve project {}, skipping: {e}", unit.id);
                    cursor = None;
                    continue;
                }
            };

            let origin = ctx.client.issues_path(&query_key);
            let resume = cursor.take().filter(|c| {
                let ours = c.belongs_to(&origin);
                if !ours {
                    warn!("Discarding cursor from '{}' while resuming {origin}", c.origin);
                }
                ours
            });
            debug!(
                "Extracting issues for project {query_key} ({}/{})",
                index + 1,
                groupings.len()
            );

            match Self::extract_grouping(ctx, unit, &query_key, resume, &mut issues).await? {
                GroupingEnd::Finished | GroupingEnd::Skipped => {}
                GroupingEnd::Interrupted(next) => {
                    info!("Deadline reached in project {query_key} after {issues} issues");
                    return Ok(WorkerOutcome::Progress(progress.with_progress(index, next)));
                }
            }
        }

        let members_index = groupings.len();
        match ctx.deadline.run(ctx.client.list_members()).await {
            None => {
                info!("Deadline reached before members were fetched");
                return Ok(WorkerOutcome::Progress(
                    progress.with_progress(members_index, None),
                ));
            }
            Some(Ok(members)) => {
                let batch = finalize_batch(RecordKind::Member, members.iter().map(normalize_user));
                users = ctx.repository.push(ItemType::SentryUsers, batch).await?;
            }
            Some(Err(e)) if e.is_permission_denied() => {
                warn!("No permission to list organization members, continuing without users");
            }
            Some(Err(e)) => return Err(e),
        }

        info!("Extracted {issues} issues and {users} users");
        Ok(WorkerOutcome::Done(DoneReport::Data { issues, users }))
    }
}

#[async_trait]
impl PhaseWorker for DataWorker {
    fn phase(&self) -> Phase {
        Phase::Data
    }

    async fn run(&self, ctx: &WorkerContext, progress: PhaseState) -> WorkerOutcome {
        Self::extract(ctx, progress)
            .await
            .unwrap_or_else(|e| WorkerOutcome::Error(format!("failed to extract data: {e}")))
    }
}
