//! Pre-made transactions.
//!
//! Each phase of deleting workflow runs is usable on its own; [`delete_workflow_runs`] runs them in order.

mod collect_run_ids;
mod delete_runs;
mod delete_workflow_runs;
mod discover_workflows;

pub use collect_run_ids::*;
pub use delete_runs::*;
pub use delete_workflow_runs::*;
pub use discover_workflows::*;

/// The default number of concurrent deletions.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// The default page size when listing workflow runs. GitHub caps it at 100.
pub const DEFAULT_PER_PAGE: u8 = 100;
