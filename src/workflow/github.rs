//! The [`ActionsClient`] backed by GitHub REST API.

#![cfg(feature = "github")]

use std::{
    error::Error as _,
    fmt::{self, Debug},
};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url, header};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, error, info};

use crate::{
    env::GITHUB_API_URL,
    workflow::{
        ActionsClient, ClientError, Repository, RunId, RunsPage, RunsQuery, WorkflowId,
        WorkflowRun, WorkflowSummary,
    },
};

const USER_AGENT: &str = concat!("delete-workflow-runs/", env!("CARGO_PKG_VERSION"));

/// GitHub caps the page size at 100.
const WORKFLOWS_PER_PAGE: u8 = 100;

#[derive(Debug, Deserialize)]
struct Workflows {
    total_count: u64,
    workflows: Vec<WorkflowSummary>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRuns {
    total_count: u64,
    workflow_runs: Vec<WorkflowRun>,
}

/// Talks to GitHub REST API with a bearer token.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Creates a [`GitHubClient`] authenticating with `token` against [`GITHUB_API_URL`].
    pub fn new<T>(token: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            http: reqwest::Client::new(),
            api_url: GITHUB_API_URL.clone(),
            token: token.into(),
        }
    }

    /// Points the client at another API base URL, such as a GitHub Enterprise server.
    pub fn with_api_url<U>(mut self, api_url: U) -> Self
    where
        U: Into<String>,
    {
        let api_url: String = api_url.into();
        self.api_url = api_url.trim_end_matches('/').to_owned();
        self
    }

    /// The API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn repository_url(&self, repository: &Repository) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url, repository.owner, repository.name
        )
    }

    /// Builds a request for GitHub REST API.
    fn request_builder(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header(header::USER_AGENT, USER_AGENT)
    }

    async fn send(&self, method: Method, url: &str) -> Result<Response, ClientError> {
        let response = match self.request_builder(method, url).send().await {
            Ok(response) => response,
            Err(err) => {
                error!("failed to request {url}: {err}");
                return Err(ClientError::RequestFailed {
                    url: url.to_owned(),
                    reason: err.to_string(),
                });
            }
        };

        match response.status() {
            status if status.is_success() => Ok(response),
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                error!("not authorized to request {url}: {}", status.as_u16());
                Err(ClientError::Unauthorized {
                    url: url.to_owned(),
                    status: status.as_u16(),
                })
            }
            status => {
                let reason = match status.canonical_reason() {
                    Some(reason) => format!("{} {reason}", status.as_u16()),
                    None => status.as_u16().to_string(),
                };
                error!("failed to request {url}: {reason}");
                Err(ClientError::RequestFailed {
                    url: url.to_owned(),
                    reason,
                })
            }
        }
    }

    async fn get_json<T>(&self, url: &str) -> Result<(T, Option<u32>), ClientError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::GET, url).await?;
        let next_page = next_page(response.headers());

        match response.json::<T>().await {
            Ok(body) => Ok((body, next_page)),
            Err(err) => {
                error!("failed to parse data from {url}: {err}");

                if let Some(source) = err.source() {
                    error!("{source}")
                }

                Err(ClientError::RequestFailed {
                    url: url.to_owned(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl ActionsClient for GitHubClient {
    async fn list_workflows(
        &self,
        repository: &Repository,
    ) -> Result<Vec<WorkflowSummary>, ClientError> {
        let mut workflows = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = format!(
                "{}/actions/workflows?per_page={WORKFLOWS_PER_PAGE}&page={page}",
                self.repository_url(repository)
            );
            debug!("fetching workflows from {url}…");

            let (body, next_page) = self.get_json::<Workflows>(&url).await?;
            debug!(
                "fetched {} of {} workflows from {url}",
                body.workflows.len(),
                body.total_count
            );
            workflows.extend(body.workflows);

            match next_page {
                Some(next_page) if next_page > page => page = next_page,
                _ => break,
            }
        }

        info!("fetched {} workflows of {repository}", workflows.len());
        Ok(workflows)
    }

    async fn list_runs(
        &self,
        repository: &Repository,
        workflow_id: WorkflowId,
        query: &RunsQuery,
    ) -> Result<RunsPage, ClientError> {
        let url = format!(
            "{}/actions/workflows/{workflow_id}/runs?status={}&per_page={}&page={}",
            self.repository_url(repository),
            query.status,
            query.per_page,
            query.current_page()
        );
        debug!("fetching workflow runs from {url}…");

        let (body, next_page) = self.get_json::<WorkflowRuns>(&url).await?;
        debug!(
            "fetched {} of {} workflow runs from {url}",
            body.workflow_runs.len(),
            body.total_count
        );

        Ok(RunsPage {
            runs: body.workflow_runs,
            next_page,
        })
    }

    async fn delete_run(&self, repository: &Repository, run_id: RunId) -> Result<(), ClientError> {
        let url = format!(
            "{}/actions/runs/{run_id}",
            self.repository_url(repository)
        );
        debug!("deleting workflow run at {url}…");

        self.send(Method::DELETE, &url).await.map(drop)
    }
}

/// Extracts the page number of the `rel="next"` link from a `Link` response header.
///
/// Returns [`None`] when there is no such link, which marks the last page.
pub fn next_page(headers: &header::HeaderMap) -> Option<u32> {
    let link = headers.get(header::LINK)?.to_str().ok()?;

    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params
            .split(';')
            .any(|param| param.trim() == r#"rel="next""#)
        {
            return None;
        }

        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
