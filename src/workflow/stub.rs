//! An in-memory [`ActionsClient`] for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Barrier;

use crate::workflow::{
    ActionsClient, ClientError, Repository, RunId, RunStatus, RunsPage, RunsQuery, WorkflowId,
    WorkflowRun, WorkflowSummary,
};

#[derive(Debug, Default)]
pub(crate) struct StubClient {
    workflows: Vec<WorkflowSummary>,
    fail_workflows: bool,
    pages: HashMap<WorkflowId, Vec<Vec<WorkflowRun>>>,
    failing_pages: HashSet<(WorkflowId, u32)>,
    failing_deletes: HashSet<RunId>,
    runs_barrier: Option<Barrier>,
    delete_barrier: Option<Barrier>,

    run_requests: Mutex<Vec<(WorkflowId, RunsQuery)>>,
    delete_attempts: Mutex<Vec<RunId>>,
    deleted: Mutex<HashSet<RunId>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_workflow(mut self, id: WorkflowId, name: &str) -> Self {
        self.workflows.push(WorkflowSummary {
            id,
            name: name.to_owned(),
        });
        self
    }

    pub(crate) fn with_failing_workflows(mut self) -> Self {
        self.fail_workflows = true;
        self
    }

    /// Adds the pages served for a workflow, in order. Each run is an `(id, status)` pair.
    pub(crate) fn with_pages(
        mut self,
        workflow_id: WorkflowId,
        pages: Vec<Vec<(RunId, RunStatus)>>,
    ) -> Self {
        let pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|(id, status)| WorkflowRun {
                        id,
                        status: Some(status),
                    })
                    .collect()
            })
            .collect();
        self.pages.insert(workflow_id, pages);
        self
    }

    /// Adds completed runs for a workflow, all on one page.
    pub(crate) fn with_completed_runs(self, workflow_id: WorkflowId, runs: &[RunId]) -> Self {
        let page = runs.iter().map(|id| (*id, RunStatus::Completed)).collect();
        self.with_pages(workflow_id, vec![page])
    }

    pub(crate) fn with_failing_page(mut self, workflow_id: WorkflowId, page: u32) -> Self {
        self.failing_pages.insert((workflow_id, page));
        self
    }

    pub(crate) fn with_failing_delete(mut self, run_id: RunId) -> Self {
        self.failing_deletes.insert(run_id);
        self
    }

    /// Makes every page request wait until `parties` page requests are in flight together.
    pub(crate) fn with_runs_barrier(mut self, parties: usize) -> Self {
        self.runs_barrier = Some(Barrier::new(parties));
        self
    }

    /// Makes every delete request wait until `parties` delete requests are in flight together.
    pub(crate) fn with_delete_barrier(mut self, parties: usize) -> Self {
        self.delete_barrier = Some(Barrier::new(parties));
        self
    }

    pub(crate) fn run_requests(&self, workflow_id: WorkflowId) -> Vec<RunsQuery> {
        self.run_requests
            .lock()
            .iter()
            .filter(|(id, _)| *id == workflow_id)
            .map(|(_, query)| *query)
            .collect()
    }

    pub(crate) fn delete_attempts(&self) -> Vec<RunId> {
        let mut attempts = self.delete_attempts.lock().clone();
        attempts.sort_unstable();
        attempts
    }

    pub(crate) fn deleted(&self) -> Vec<RunId> {
        let mut deleted: Vec<_> = self.deleted.lock().iter().copied().collect();
        deleted.sort_unstable();
        deleted
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn failure(url: String) -> ClientError {
        ClientError::RequestFailed {
            url,
            reason: "500 Internal Server Error".to_owned(),
        }
    }
}

#[async_trait]
impl ActionsClient for StubClient {
    async fn list_workflows(
        &self,
        repository: &Repository,
    ) -> Result<Vec<WorkflowSummary>, ClientError> {
        if self.fail_workflows {
            return Err(ClientError::Unauthorized {
                url: format!("stub://{repository}/workflows"),
                status: 401,
            });
        }
        Ok(self.workflows.clone())
    }

    async fn list_runs(
        &self,
        repository: &Repository,
        workflow_id: WorkflowId,
        query: &RunsQuery,
    ) -> Result<RunsPage, ClientError> {
        self.run_requests.lock().push((workflow_id, *query));
        match &self.runs_barrier {
            Some(barrier) => drop(barrier.wait().await),
            None => tokio::task::yield_now().await,
        }

        let page = query.current_page();
        if self.failing_pages.contains(&(workflow_id, page)) {
            return Err(Self::failure(format!(
                "stub://{repository}/workflows/{workflow_id}/runs?page={page}"
            )));
        }

        let pages = self.pages.get(&workflow_id).map(Vec::as_slice).unwrap_or_default();
        let runs = pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        let next_page = (page < pages.len() as u32).then_some(page + 1);

        Ok(RunsPage { runs, next_page })
    }

    async fn delete_run(&self, repository: &Repository, run_id: RunId) -> Result<(), ClientError> {
        self.delete_attempts.lock().push(run_id);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        match &self.delete_barrier {
            Some(barrier) => drop(barrier.wait().await),
            None => tokio::task::yield_now().await,
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let url = format!("stub://{repository}/runs/{run_id}");
        if self.failing_deletes.contains(&run_id) || !self.deleted.lock().insert(run_id) {
            return Err(ClientError::RequestFailed {
                url,
                reason: "404 Not Found".to_owned(),
            });
        }
        Ok(())
    }
}
