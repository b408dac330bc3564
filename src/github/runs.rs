//! Actions API queries via octocrab.
//!
//! Implements `RunLister` and `WorkflowResolver` for `GitHubClient`.
//!
//! Key implementation details:
//! - In-flight runs are the union of the `in_progress` and `queued` listings;
//!   the API has no single filter for both
//! - Every listing is paginated at 100 items per page
//! - Each page request is retried independently on transient errors
//! - A run that moves from `queued` to `in_progress` between the two listings
//!   can show up twice, so results are de-duplicated by ID

use crate::lister::{RunLister, WorkflowResolver};
use crate::types::{RepoId, Run, RunId, RunStatus, WorkflowId};

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::retry::retry_with_backoff;

/// Page size for list endpoints (the API maximum).
const PER_PAGE: u8 = 100;

/// Safety limit to prevent runaway pagination.
const MAX_PAGES: u32 = 50;

/// The statuses that mean a run still occupies the lane.
const IN_FLIGHT: [RunStatus; 2] = [RunStatus::InProgress, RunStatus::Queued];

impl RunLister for GitHubClient {
    type Error = GitHubApiError;

    async fn list_runs(
        &self,
        repo: &RepoId,
        branch: Option<&str>,
        workflow: WorkflowId,
    ) -> Result<Vec<Run>, Self::Error> {
        let mut listings = Vec::with_capacity(IN_FLIGHT.len());
        for status in &IN_FLIGHT {
            listings.push(list_runs_with_status(self, repo, branch, workflow, status).await?);
        }
        let runs = merge_listings(listings);

        tracing::debug!(
            repo = %repo,
            workflow = %workflow,
            branch = branch.unwrap_or("*"),
            count = runs.len(),
            "Listed in-flight runs"
        );
        Ok(runs)
    }
}

impl WorkflowResolver for GitHubClient {
    type Error = GitHubApiError;

    async fn find_workflow(
        &self,
        repo: &RepoId,
        name: &str,
    ) -> Result<Option<WorkflowId>, Self::Error> {
        let mut page = 1u32;

        loop {
            let result = retry_with_backoff(self.retry_config(), || {
                fetch_workflow_page(self, repo, page)
            })
            .await?;

            let last_page = is_last_page(result.len());
            if let Some(id) = find_by_name(result, name) {
                return Ok(Some(id));
            }

            if last_page || page >= MAX_PAGES {
                return Ok(None);
            }
            page += 1;
        }
    }
}

/// A page shorter than `PER_PAGE` is the last one.
fn is_last_page(len: usize) -> bool {
    len < PER_PAGE as usize
}

/// Combines per-status listings into one snapshot, newest first, one entry
/// per run ID. The first listing wins when a run appears in several.
fn merge_listings(listings: impl IntoIterator<Item = Vec<Run>>) -> Vec<Run> {
    let mut runs: Vec<Run> = listings.into_iter().flatten().collect();
    runs.sort_by(|a, b| b.id.cmp(&a.id));
    runs.dedup_by_key(|run| run.id);
    runs
}

/// The first workflow whose display name matches exactly.
fn find_by_name(workflows: Vec<(WorkflowId, String)>, name: &str) -> Option<WorkflowId> {
    workflows
        .into_iter()
        .find(|(_, workflow_name)| workflow_name == name)
        .map(|(id, _)| id)
}

async fn list_runs_with_status(
    client: &GitHubClient,
    repo: &RepoId,
    branch: Option<&str>,
    workflow: WorkflowId,
    status: &RunStatus,
) -> Result<Vec<Run>, GitHubApiError> {
    let mut page = 1u32;
    let mut all_runs = Vec::new();

    loop {
        let items = retry_with_backoff(client.retry_config(), || {
            fetch_run_page(client, repo, branch, workflow, status, page)
        })
        .await?;

        let last_page = is_last_page(items.len());
        all_runs.extend(items);

        if last_page {
            break;
        }
        if page >= MAX_PAGES {
            tracing::warn!(
                workflow = %workflow,
                status = status.as_api_str(),
                "Run listing hit the page limit; snapshot may be incomplete"
            );
            break;
        }
        page += 1;
    }

    Ok(all_runs)
}

async fn fetch_run_page(
    client: &GitHubClient,
    repo: &RepoId,
    branch: Option<&str>,
    workflow: WorkflowId,
    status: &RunStatus,
    page: u32,
) -> Result<Vec<Run>, GitHubApiError> {
    let handler = client
        .inner()
        .workflows(repo.owner.as_str(), repo.repo.as_str());

    let mut request = handler
        .list_runs(workflow.to_string())
        .status(status.as_api_str())
        .per_page(PER_PAGE)
        .page(page);
    if let Some(branch) = branch {
        request = request.branch(branch);
    }

    let result = request.send().await.map_err(GitHubApiError::from_octocrab)?;

    Ok(result
        .items
        .into_iter()
        .map(|run| {
            Run::new(
                RunId(run.id.into_inner()),
                run.html_url.to_string(),
                RunStatus::from_api_str(&run.status),
                run.head_branch,
            )
        })
        .collect())
}

async fn fetch_workflow_page(
    client: &GitHubClient,
    repo: &RepoId,
    page: u32,
) -> Result<Vec<(WorkflowId, String)>, GitHubApiError> {
    let result = client
        .inner()
        .workflows(repo.owner.as_str(), repo.repo.as_str())
        .list()
        .per_page(PER_PAGE)
        .page(page)
        .send()
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(result
        .items
        .into_iter()
        .map(|workflow| (WorkflowId(workflow.id.into_inner()), workflow.name))
        .collect())
}
