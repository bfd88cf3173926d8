use async_trait::async_trait;
use thiserror::Error;

use crate::workflow::{Repository, RunId, RunStatus, WorkflowId, WorkflowRun, WorkflowSummary};

/// A failed request to the remote service.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request could not be sent, was answered with an unexpected status, or had an unreadable response.
    #[error("request to {url} failed: {reason}")]
    RequestFailed {
        /// The requested URL.
        url: String,
        /// What went wrong, such as `404 Not Found`.
        reason: String,
    },
    /// The service rejected the credential.
    #[error("not authorized to request {url}: {status}")]
    Unauthorized {
        /// The requested URL.
        url: String,
        /// The HTTP status code, 401 or 403.
        status: u16,
    },
}

/// Parameters of one page request when listing workflow runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunsQuery {
    /// Only runs with this status are requested.
    pub status: RunStatus,
    /// The number of runs per page.
    pub per_page: u8,
    /// The 1-based page to fetch. [`None`] fetches the first page.
    pub page: Option<u32>,
}

impl RunsQuery {
    /// Queries the first page of completed runs.
    pub fn completed(per_page: u8) -> Self {
        Self {
            status: RunStatus::Completed,
            per_page,
            page: None,
        }
    }

    /// The page this query fetches.
    pub fn current_page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// One page of workflow runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunsPage {
    /// The runs on this page, in the order GitHub lists them.
    pub runs: Vec<WorkflowRun>,
    /// The page to request next, or [`None`] if this is the last page.
    pub next_page: Option<u32>,
}

/// The capabilities of GitHub Actions that deleting workflow runs relies on.
#[async_trait]
pub trait ActionsClient: Send + Sync {
    /// Lists every workflow of a repository.
    async fn list_workflows(
        &self,
        repository: &Repository,
    ) -> Result<Vec<WorkflowSummary>, ClientError>;

    /// Lists one page of the runs of a workflow.
    async fn list_runs(
        &self,
        repository: &Repository,
        workflow_id: WorkflowId,
        query: &RunsQuery,
    ) -> Result<RunsPage, ClientError>;

    /// Deletes a workflow run.
    async fn delete_run(&self, repository: &Repository, run_id: RunId) -> Result<(), ClientError>;
}
