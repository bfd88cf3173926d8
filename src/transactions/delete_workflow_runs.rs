use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    framework::AggregateError,
    transactions::{
        CollectError, DEFAULT_MAX_WORKERS, DEFAULT_PER_PAGE, DeleteRunsError, collect_all_run_ids,
        delete_runs, discover_workflows,
    },
    workflow::{ActionsClient, ClientError, Repository, WorkflowTarget},
};

/// Tunes a [`delete_workflow_runs`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// The maximum number of delete requests in flight.
    pub max_workers: usize,
    /// The page size when listing runs.
    pub per_page: u8,
    /// Discovers and collects, but deletes nothing.
    pub dry_run: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            per_page: DEFAULT_PER_PAGE,
            dry_run: false,
        }
    }
}

/// What a successful [`delete_workflow_runs`] pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// The number of selected workflows.
    pub workflows: usize,
    /// The number of completed runs collected.
    pub collected: usize,
    /// The number of runs deleted. Zero on a dry run.
    pub deleted: usize,
}

/// The phase a [`delete_workflow_runs`] pass failed in.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SweepError {
    /// Listing the workflows failed. Nothing was deleted.
    #[error("failed to get workflows: {0}")]
    Discovery(#[source] ClientError),
    /// Collecting the runs of at least one workflow failed. Nothing was deleted.
    #[error("failed to get run IDs for some workflows: {0}")]
    Collection(#[source] AggregateError<CollectError>),
    /// At least one deletion failed. Every other run was still deleted.
    #[error(transparent)]
    Deletion(#[from] DeleteRunsError),
}

/// Deletes the completed runs of the workflows of `repository` selected by `target`.
///
/// A failure to collect the runs of any workflow is fatal: no run is deleted, not even those of the workflows that were collected.
///
/// # Errors
///
/// Returns a [`SweepError`] for the phase that failed.
///
/// # Panics
///
/// See [`delete_runs`].
pub async fn delete_workflow_runs<C>(
    client: Arc<C>,
    repository: &Repository,
    target: &WorkflowTarget,
    options: &SweepOptions,
) -> Result<SweepSummary, SweepError>
where
    C: ActionsClient + ?Sized + 'static,
{
    let mut workflows = discover_workflows(&*client, repository, target)
        .await
        .map_err(SweepError::Discovery)?;
    if workflows.is_empty() {
        warn!("no workflow runs to delete in {repository} for workflow {target:?}");
        return Ok(SweepSummary::default());
    }

    collect_all_run_ids(&*client, repository, &mut workflows, options.per_page)
        .await
        .map_err(SweepError::Collection)?;

    let mut summary = SweepSummary {
        workflows: workflows.len(),
        collected: workflows.iter().map(|workflow| workflow.runs.len()).sum(),
        deleted: 0,
    };

    if options.dry_run {
        for workflow in &workflows {
            info!(
                "would delete {} workflow runs for workflow {workflow}: {:?}",
                workflow.runs.len(),
                workflow.runs
            );
        }
        return Ok(summary);
    }

    info!(
        "starting to delete {} workflow runs of {} workflows…",
        summary.collected, summary.workflows
    );
    summary.deleted = delete_runs(client, repository, &workflows, options.max_workers).await?;
    info!("{} workflow runs deleted successfully", summary.deleted);

    Ok(summary)
}
