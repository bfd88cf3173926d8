use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::{
    framework::{AggregateError, ErrorCollector, WorkerPool},
    workflow::{ActionsClient, ClientError, Repository, RunId, Workflow},
};

/// Deleting one workflow run failed.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The delete request failed.
    #[error("error deleting workflow run {run_id} for workflow {workflow}: {source}")]
    Request {
        /// The run that could not be deleted.
        run_id: RunId,
        /// The name of the workflow the run belongs to.
        workflow: Arc<str>,
        /// The failed delete request.
        #[source]
        source: ClientError,
    },
    /// The worker deleting the run panicked.
    #[error("worker deleting workflow run {run_id} for workflow {workflow} panicked")]
    Panicked {
        /// The run the worker was deleting.
        run_id: RunId,
        /// The name of the workflow the run belongs to.
        workflow: Arc<str>,
    },
}

impl DeleteError {
    /// The run that could not be deleted.
    pub fn run_id(&self) -> RunId {
        match self {
            Self::Request { run_id, .. } | Self::Panicked { run_id, .. } => *run_id,
        }
    }

    /// The name of the workflow the run belongs to.
    pub fn workflow(&self) -> &str {
        match self {
            Self::Request { workflow, .. } | Self::Panicked { workflow, .. } => workflow,
        }
    }
}

/// Some deletions of a batch failed. The others went through and are not rolled back.
#[derive(Debug, Error)]
#[error("failed to delete some workflow runs ({deleted} deleted): {failures}")]
pub struct DeleteRunsError {
    /// The number of runs deleted successfully.
    pub deleted: usize,
    /// Every failed deletion.
    #[source]
    pub failures: AggregateError<DeleteError>,
}

/// Deletes every collected run of `workflows`, with at most `max_workers` delete requests in flight.
///
/// Runs are queued in workflow order, then in the order they were collected. A failed deletion is never retried and never stops the others.
///
/// Returns the number of deleted runs.
///
/// # Errors
///
/// Returns a [`DeleteRunsError`] listing every failed deletion if there was at least one.
///
/// # Panics
///
/// See [`WorkerPool::acquire`].
pub async fn delete_runs<C>(
    client: Arc<C>,
    repository: &Repository,
    workflows: &[Workflow],
    max_workers: usize,
) -> Result<usize, DeleteRunsError>
where
    C: ActionsClient + ?Sized + 'static,
{
    let repository = Arc::new(repository.clone());
    let pool = WorkerPool::new(max_workers);
    let errors = ErrorCollector::new();
    let deleted = Arc::new(AtomicUsize::new(0));

    let mut tasks = JoinSet::new();
    let mut spawned = HashMap::new();

    for workflow in workflows {
        let name: Arc<str> = Arc::from(workflow.name.as_str());

        for &run_id in &workflow.runs {
            let client = client.clone();
            let repository = repository.clone();
            let workflow = name.clone();
            let reporter = errors.reporter();
            let deleted = deleted.clone();

            let handle = pool
                .spawn(&mut tasks, async move {
                    match client.delete_run(&repository, run_id).await {
                        Ok(()) => {
                            deleted.fetch_add(1, Ordering::SeqCst);
                            info!("successfully deleted workflow run {run_id} for workflow {workflow:?}");
                        }
                        Err(source) => {
                            let err = DeleteError::Request {
                                run_id,
                                workflow,
                                source,
                            };
                            error!("{err}");
                            reporter.report(err);
                        }
                    }
                })
                .await;
            spawned.insert(handle.id(), (run_id, name.clone()));
        }
    }

    let reporter = errors.reporter();
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, ())) => {
                spawned.remove(&id);
            }
            Err(err) => {
                if let Some((run_id, workflow)) = spawned.remove(&err.id()) {
                    let err = DeleteError::Panicked { run_id, workflow };
                    error!("{err}");
                    reporter.report(err);
                }
            }
        }
    }
    drop(reporter);
    debug_assert!(spawned.is_empty(), "every spawned deletion is joined");

    let deleted = deleted.load(Ordering::SeqCst);
    match errors.finish().await {
        Ok(()) => Ok(deleted),
        Err(failures) => Err(DeleteRunsError { deleted, failures }),
    }
}
