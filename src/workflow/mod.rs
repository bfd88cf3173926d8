//! Data models of GitHub Actions workflows and the client used to reach them.

use std::{
    convert::Infallible,
    fmt::{self, Display},
    str::FromStr,
};

use serde::Deserialize;

mod client;
pub mod github;
#[cfg(test)]
pub(crate) mod stub;

pub use client::*;

/// The identifier of a workflow.
pub type WorkflowId = u64;

/// The identifier of a workflow run.
pub type RunId = u64;

/// Identifies a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    /// The user or organization owning the repository.
    pub owner: String,
    /// The repository name.
    pub name: String,
}

impl Repository {
    /// Creates a [`Repository`].
    pub fn new<O, N>(owner: O, name: N) -> Self
    where
        O: Into<String>,
        N: Into<String>,
    {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Represents a workflow as listed by GitHub REST API.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkflowSummary {
    /// The unique id of the workflow.
    pub id: WorkflowId,
    /// The name of the workflow, as set in its file.
    pub name: String,
}

/// A workflow selected for deletion, along with the completed runs collected for it.
///
/// `runs` is empty until the run collector fills it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    /// The unique id of the workflow.
    pub id: WorkflowId,
    /// The name of the workflow.
    pub name: String,
    /// The ids of the completed runs to delete.
    pub runs: Vec<RunId>,
}

impl From<WorkflowSummary> for Workflow {
    fn from(summary: WorkflowSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            runs: Vec::new(),
        }
    }
}

impl Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// The lifecycle status of a workflow run.
#[non_exhaustive]
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run was requested but not queued yet.
    Requested,
    /// The run is queued.
    Queued,
    /// The run is waiting for a concurrency group.
    Pending,
    /// The run is waiting for a deployment protection rule.
    Waiting,
    /// The run is running.
    InProgress,
    /// The run needs someone to act on it.
    ActionRequired,
    /// The run finished, whatever its conclusion.
    Completed,
    /// Any status this crate does not know about.
    #[serde(other)]
    Other,
}

impl RunStatus {
    /// The status as written in GitHub REST API queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::InProgress => "in_progress",
            Self::ActionRequired => "action_required",
            Self::Completed => "completed",
            Self::Other => "other",
        }
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a GitHub Actions workflow run from GitHub REST API.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    /// The unique id of the run.
    pub id: RunId,
    /// The status of the run. [`None`] if GitHub left it out.
    #[serde(default)]
    pub status: Option<RunStatus>,
}

impl WorkflowRun {
    /// Whether the run reached its terminal status.
    pub fn is_completed(&self) -> bool {
        self.status == Some(RunStatus::Completed)
    }
}

/// Selects the workflows to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowTarget {
    /// Every workflow of the repository.
    #[default]
    All,
    /// Only the workflows with exactly this name.
    Named(String),
}

impl WorkflowTarget {
    /// The text selecting every workflow.
    pub const ALL: &'static str = "all";

    /// Whether a workflow with the given name is selected.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(target) => target == name,
        }
    }
}

impl From<&str> for WorkflowTarget {
    fn from(value: &str) -> Self {
        match value {
            Self::ALL => Self::All,
            name => Self::Named(name.to_owned()),
        }
    }
}

impl FromStr for WorkflowTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Display for WorkflowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL),
            Self::Named(name) => f.write_str(name),
        }
    }
}
