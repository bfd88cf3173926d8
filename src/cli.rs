//! The command-line interface.

use std::{num::NonZeroUsize, sync::Arc};

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt::writer::MakeWriterExt as _};

use crate::{
    env::{MAX_WORKERS, PER_PAGE},
    transactions::{SweepError, SweepOptions, SweepSummary, delete_workflow_runs},
    workflow::{Repository, WorkflowTarget, github::GitHubClient},
};

/// delete-workflow-runs is a command-line tool to delete GitHub Actions workflow runs.
#[derive(Debug, Parser)]
#[command(name = "delete-workflow-runs", version)]
#[command(
    long_about = "delete-workflow-runs is a command-line tool to delete GitHub Actions workflow runs.

It deletes all workflow runs of a repository or only the runs of a specific workflow.
Only 'completed' workflow runs are considered for deletion.

The provided token must have the following permissions:
- Read access to metadata
- Read and Write access to actions"
)]
pub struct Cli {
    /// Repository owner
    #[arg(short, long)]
    pub owner: String,

    /// Repository name
    #[arg(short, long)]
    pub repo: String,

    /// API token to get and delete workflow runs
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Workflow to delete runs from or 'all' to delete all runs
    #[arg(short, long, default_value = WorkflowTarget::ALL)]
    pub workflow: WorkflowTarget,

    /// Maximum number of concurrent deletions [default: 10, env: MAX_WORKERS]
    #[arg(long)]
    pub max_workers: Option<NonZeroUsize>,

    /// Number of runs requested per page (1-100) [default: 100, env: PER_PAGE]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub per_page: Option<u8>,

    /// List the runs that would be deleted without deleting them
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// The repository to operate on.
    pub fn repository(&self) -> Repository {
        Repository::new(&self.owner, &self.repo)
    }

    /// The options of the pass, falling back to the environment for those not given.
    pub fn options(&self) -> SweepOptions {
        SweepOptions {
            max_workers: self.max_workers.map_or(*MAX_WORKERS, NonZeroUsize::get),
            per_page: self.per_page.unwrap_or(*PER_PAGE),
            dry_run: self.dry_run,
        }
    }
}

/// Installs the global tracing subscriber.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Warnings and errors go to standard error, everything else to standard output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .init();
}

/// Deletes the workflow runs selected by `cli` through GitHub REST API.
///
/// # Errors
///
/// See [`delete_workflow_runs`].
///
/// # Panics
///
/// See [`delete_workflow_runs`].
pub async fn run(cli: &Cli) -> Result<SweepSummary, SweepError> {
    let client = Arc::new(GitHubClient::new(cli.token.as_str()));
    delete_workflow_runs(client, &cli.repository(), &cli.workflow, &cli.options()).await
}
