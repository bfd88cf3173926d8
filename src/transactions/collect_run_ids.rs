use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    framework::{AggregateError, ErrorCollector},
    workflow::{ActionsClient, ClientError, Repository, RunId, RunsQuery, Workflow},
};

/// Collecting the runs of one workflow failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to get workflow runs for {workflow}: {source}")]
pub struct CollectError {
    /// The name of the workflow.
    pub workflow: String,
    /// The failed page request.
    #[source]
    pub source: ClientError,
}

/// Pages through the completed runs of `workflow` and returns their ids in the order GitHub lists them.
///
/// Every run's own status is checked again, so a run that slipped through the status filter is skipped.
///
/// # Errors
///
/// Returns a [`CollectError`] naming the workflow as soon as any page request fails. Runs from earlier pages are discarded.
pub async fn collect_run_ids<C>(
    client: &C,
    repository: &Repository,
    workflow: &Workflow,
    per_page: u8,
) -> Result<Vec<RunId>, CollectError>
where
    C: ActionsClient + ?Sized,
{
    let mut run_ids = Vec::new();
    let mut query = RunsQuery::completed(per_page);

    loop {
        let page = client
            .list_runs(repository, workflow.id, &query)
            .await
            .map_err(|source| CollectError {
                workflow: workflow.name.clone(),
                source,
            })?;

        let before = run_ids.len();
        run_ids.extend(
            page.runs
                .iter()
                .filter(|run| run.is_completed())
                .map(|run| run.id),
        );
        debug!(
            "collected {} of {} runs from page {} of workflow {workflow}",
            run_ids.len() - before,
            page.runs.len(),
            query.current_page()
        );

        match page.next_page {
            Some(next_page) if next_page > query.current_page() => query.page = Some(next_page),
            _ => break,
        }
    }

    info!(
        "collected {} completed runs of workflow {workflow}",
        run_ids.len()
    );
    Ok(run_ids)
}

/// Collects the completed runs of every workflow concurrently, one unit per workflow, and stores them in [`Workflow::runs`].
///
/// Each unit writes only its own workflow. Workflows whose collection succeeded keep their runs even if others failed.
///
/// # Errors
///
/// Returns an [`AggregateError`] with a [`CollectError`] for every workflow that failed.
pub async fn collect_all_run_ids<C>(
    client: &C,
    repository: &Repository,
    workflows: &mut [Workflow],
    per_page: u8,
) -> Result<(), AggregateError<CollectError>>
where
    C: ActionsClient + ?Sized,
{
    let errors = ErrorCollector::new();

    let units = workflows.iter_mut().map(|workflow| {
        let reporter = errors.reporter();
        async move {
            let result = collect_run_ids(client, repository, workflow, per_page).await;
            match result {
                Ok(run_ids) => workflow.runs = run_ids,
                Err(err) => {
                    error!("{err}");
                    reporter.report(err);
                }
            }
        }
    });
    join_all(units).await;

    errors.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::workflow::{
        RunStatus::{Completed, InProgress, Queued},
        WorkflowSummary,
        stub::StubClient,
    };

    fn workflow(id: u64, name: &str) -> Workflow {
        Workflow::from(WorkflowSummary {
            id,
            name: name.to_owned(),
        })
    }

    #[tokio::test]
    async fn keeps_only_completed_runs_across_pages() {
        let repository = Repository::new("acme", "demo");
        let client = StubClient::new().with_pages(
            1,
            vec![
                vec![(101, Completed), (150, InProgress), (102, Completed)],
                vec![(160, Queued), (103, Completed)],
            ],
        );

        let run_ids = collect_run_ids(&client, &repository, &workflow(1, "ci"), 3)
            .await
            .unwrap();

        assert_eq!(run_ids, vec![101, 102, 103]);
    }

    #[tokio::test]
    async fn requests_exactly_one_query_per_page() {
        let repository = Repository::new("acme", "demo");
        let pages = (0..4).map(|n| vec![(n, Completed)]).collect();
        let client = StubClient::new().with_pages(1, pages);

        collect_run_ids(&client, &repository, &workflow(1, "ci"), 1)
            .await
            .unwrap();

        let requests = client.run_requests(1);
        let requested_pages: Vec<u32> = requests.iter().map(RunsQuery::current_page).collect();
        assert_eq!(requested_pages, vec![1, 2, 3, 4]);
        assert!(
            requests
                .iter()
                .all(|query| query.status == Completed && query.per_page == 1)
        );
    }

    #[tokio::test]
    async fn workflow_without_runs_is_empty() {
        let repository = Repository::new("acme", "demo");
        let client = StubClient::new();

        let run_ids = collect_run_ids(&client, &repository, &workflow(9, "idle"), 100)
            .await
            .unwrap();

        assert!(run_ids.is_empty());
        assert_eq!(client.run_requests(9).len(), 1);
    }

    #[tokio::test]
    async fn page_failure_names_the_workflow() {
        let repository = Repository::new("acme", "demo");
        let client = StubClient::new()
            .with_pages(1, vec![vec![(101, Completed)], vec![(102, Completed)]])
            .with_failing_page(1, 2);

        let err = collect_run_ids(&client, &repository, &workflow(1, "ci"), 1)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert_eq!(err.workflow, "ci");
        assert!(message.starts_with("failed to get workflow runs for ci: "));
    }

    #[tokio::test]
    async fn fills_every_workflow() {
        let repository = Repository::new("acme", "demo");
        let client = StubClient::new()
            .with_completed_runs(1, &[101, 102])
            .with_completed_runs(2, &[201]);
        let mut workflows = vec![workflow(1, "ci"), workflow(2, "release")];

        collect_all_run_ids(&client, &repository, &mut workflows, 100)
            .await
            .unwrap();

        assert_eq!(workflows[0].runs, vec![101, 102]);
        assert_eq!(workflows[1].runs, vec![201]);
    }

    #[tokio::test]
    async fn collects_workflows_concurrently() {
        let repository = Repository::new("acme", "demo");
        // Each page request waits for the other, so sequential collection never finishes.
        let client = StubClient::new()
            .with_completed_runs(1, &[101])
            .with_completed_runs(2, &[201])
            .with_runs_barrier(2);
        let mut workflows = vec![workflow(1, "ci"), workflow(2, "release")];

        tokio::time::timeout(
            Duration::from_secs(5),
            collect_all_run_ids(&client, &repository, &mut workflows, 100),
        )
        .await
        .expect("workflows were collected one after the other")
        .unwrap();

        assert_eq!(workflows[0].runs, vec![101]);
        assert_eq!(workflows[1].runs, vec![201]);
    }

    #[tokio::test]
    async fn reports_every_failed_workflow_and_keeps_the_rest() {
        let repository = Repository::new("acme", "demo");
        let client = StubClient::new()
            .with_completed_runs(1, &[101])
            .with_completed_runs(2, &[201])
            .with_completed_runs(3, &[301])
            .with_failing_page(2, 1)
            .with_failing_page(3, 1);
        let mut workflows = vec![
            workflow(1, "ci"),
            workflow(2, "release"),
            workflow(3, "nightly"),
        ];

        let err = collect_all_run_ids(&client, &repository, &mut workflows, 100)
            .await
            .unwrap_err();

        let mut failed: Vec<&str> = err.iter().map(|err| err.workflow.as_str()).collect();
        failed.sort_unstable();
        assert_eq!(failed, vec!["nightly", "release"]);
        assert_eq!(workflows[0].runs, vec![101]);
        assert!(workflows[1].runs.is_empty());
        assert!(workflows[2].runs.is_empty());
    }
}
