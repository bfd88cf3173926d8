use tracing::{debug, error, info, warn};

use crate::workflow::{ActionsClient, ClientError, Repository, Workflow, WorkflowTarget};

/// Resolves `target` to the workflows of `repository` to operate on, with their runs not yet collected.
///
/// [`WorkflowTarget::All`] selects every workflow; [`WorkflowTarget::Named`] selects those whose name matches exactly. Nothing matching is not an error here.
///
/// # Errors
///
/// Returns the [`ClientError`] if listing the workflows fails.
pub async fn discover_workflows<C>(
    client: &C,
    repository: &Repository,
    target: &WorkflowTarget,
) -> Result<Vec<Workflow>, ClientError>
where
    C: ActionsClient + ?Sized,
{
    debug!("fetching workflows of {repository}…");

    let workflows = match client.list_workflows(repository).await {
        Ok(workflows) => workflows,
        Err(err) => {
            error!("failed to get workflows of {repository}: {err}");
            return Err(err);
        }
    };

    let selected: Vec<Workflow> = workflows
        .into_iter()
        .filter(|workflow| target.matches(&workflow.name))
        .map(Workflow::from)
        .collect();

    match (target, selected.len()) {
        (WorkflowTarget::Named(name), 0) => warn!("no workflow named {name:?} in {repository}"),
        (_, 0) => warn!("no workflows in {repository}"),
        (_, 1) => info!("selected 1 workflow of {repository}"),
        (_, count) => info!("selected {count} workflows of {repository}"),
    }

    Ok(selected)
}
