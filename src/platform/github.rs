//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::payload::{
    CheckSuitesPayload, CombinedStatusPayload, MergeResponsePayload, PullRequestPayload,
    ReviewPayload, UserPayload,
};
use crate::platform::PlatformService;
use crate::types::{
    BranchProtection, CheckSuite, CombinedStatus, MergeMethod, MergeResult, PullRequest,
    Repository, Review,
};
use async_trait::async_trait;
use octocrab::{Octocrab, Page};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Public GitHub API
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page GitHub serves
const PER_PAGE: u8 = 100;

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
}

#[derive(Serialize)]
struct ListPullsParams<'a> {
    state: &'a str,
    head: &'a str,
    per_page: u8,
}

#[derive(Serialize)]
struct MergeBody<'a> {
    sha: &'a str,
    merge_method: String,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    /// Token for raw HTTP requests (status-code sensitive endpoints)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API base URL without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `api_url` defaults to `https://api.github.com`; pass
    /// `https://<host>/api/v3` for GitHub Enterprise.
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self> {
        let api_url = Url::parse(api_url.unwrap_or(DEFAULT_API_URL))
            .map_err(|e| Error::GitHubApi(format!("invalid API URL: {e}")))?;
        let api_base = api_url.as_str().trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("merge-me")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    /// Build a raw GET request with GitHub headers
    fn raw_get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(format!("{}{path}", self.api_base))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

fn repo_path(repo: &Repository) -> String {
    format!("/repos/{}/{}", repo.owner, repo.name)
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_branch_protection(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<BranchProtection> {
        debug!(%repo, branch, "getting branch protection");

        let path = format!(
            "{}/branches/{}/protection",
            repo_path(repo),
            urlencoding::encode(branch)
        );
        let response = self
            .raw_get(&path)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch branch protection: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(BranchProtection::Protected),
            StatusCode::NOT_FOUND => Ok(BranchProtection::Unprotected),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::GitHubApi(format!(
                    "branch protection for {repo}@{branch} returned {status}: {body}"
                )))
            }
        }
    }

    async fn get_combined_status(&self, repo: &Repository, sha: &str) -> Result<CombinedStatus> {
        debug!(%repo, sha, "getting combined status");

        let status: CombinedStatusPayload = self
            .client
            .get(
                format!("{}/commits/{sha}/status", repo_path(repo)),
                Some(&PageParams { per_page: PER_PAGE }),
            )
            .await?;

        debug!(state = %status.state, count = status.statuses.len(), "combined status result");
        Ok(status.into())
    }

    async fn list_check_suites(&self, repo: &Repository, sha: &str) -> Result<Vec<CheckSuite>> {
        debug!(%repo, sha, "listing check suites");

        let suites: CheckSuitesPayload = self
            .client
            .get(
                format!("{}/commits/{sha}/check-suites", repo_path(repo)),
                Some(&PageParams { per_page: PER_PAGE }),
            )
            .await?;

        let result: Vec<CheckSuite> = suites.check_suites.into_iter().map(Into::into).collect();
        debug!(count = result.len(), "listed check suites");
        Ok(result)
    }

    async fn list_reviews(&self, repo: &Repository, pr_number: u64) -> Result<Vec<Review>> {
        debug!(%repo, pr_number, "listing reviews");

        let first: Page<ReviewPayload> = self
            .client
            .get(
                format!("{}/pulls/{pr_number}/reviews", repo_path(repo)),
                Some(&PageParams { per_page: PER_PAGE }),
            )
            .await?;
        let reviews = self.client.all_pages(first).await?;

        let result: Vec<Review> = reviews
            .into_iter()
            .filter_map(ReviewPayload::into_review)
            .collect();
        debug!(pr_number, count = result.len(), "listed reviews");
        Ok(result)
    }

    async fn is_collaborator(&self, repo: &Repository, username: &str) -> Result<bool> {
        debug!(%repo, username, "checking collaborator");

        let path = format!(
            "{}/collaborators/{}",
            repo_path(repo),
            urlencoding::encode(username)
        );
        let response = self
            .raw_get(&path)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to check collaborator: {e}")))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::GitHubApi(format!(
                "collaborator check for {username} on {repo} returned {status}"
            ))),
        }
    }

    async fn list_team_members(&self, org: &str, team_slug: &str) -> Result<Vec<String>> {
        debug!(org, team_slug, "listing team members");

        let path = format!(
            "/orgs/{}/teams/{}/members",
            urlencoding::encode(org),
            urlencoding::encode(team_slug)
        );
        let response = self
            .raw_get(&path)
            .query(&PageParams { per_page: PER_PAGE })
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to list team members: {e}")))?;

        match response.status() {
            status if status.is_success() => {
                let members: Vec<UserPayload> = response.json().await.map_err(|e| {
                    Error::GitHubApi(format!("Failed to parse team members: {e}"))
                })?;
                debug!(org, team_slug, count = members.len(), "listed team members");
                Ok(members.into_iter().map(|m| m.login).collect())
            }
            StatusCode::FORBIDDEN => Err(Error::MergeCheck(format!(
                "insufficient permission to list members of team {org}/{team_slug}"
            ))),
            StatusCode::NOT_FOUND => Err(Error::MergeCheck(format!(
                "team {org}/{team_slug} not found (is {org} an organization?)"
            ))),
            status => Err(Error::GitHubApi(format!(
                "listing members of team {org}/{team_slug} returned {status}"
            ))),
        }
    }

    async fn find_open_prs(&self, repo: &Repository, head: &str) -> Result<Vec<PullRequest>> {
        debug!(%repo, head, "finding open PRs");

        let page: Page<PullRequestPayload> = self
            .client
            .get(
                format!("{}/pulls", repo_path(repo)),
                Some(&ListPullsParams {
                    state: "open",
                    head,
                    per_page: PER_PAGE,
                }),
            )
            .await?;

        let result = page
            .items
            .into_iter()
            .map(PullRequest::try_from)
            .collect::<Result<Vec<_>>>()?;
        debug!(head, count = result.len(), "found open PRs");
        Ok(result)
    }

    async fn get_pr(&self, repo: &Repository, pr_number: u64) -> Result<PullRequest> {
        debug!(%repo, pr_number, "getting PR details");

        let pr: PullRequestPayload = self
            .client
            .get(format!("{}/pulls/{pr_number}", repo_path(repo)), None::<&()>)
            .await?;

        let details = PullRequest::try_from(pr)?;
        debug!(
            pr_number,
            draft = details.is_draft,
            merged = details.is_merged,
            "got PR details"
        );
        Ok(details)
    }

    async fn merge_pr(
        &self,
        repo: &Repository,
        pr_number: u64,
        sha: &str,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        debug!(%repo, pr_number, sha, %method, "merging PR");

        let result: MergeResponsePayload = self
            .client
            .put(
                format!("{}/pulls/{pr_number}/merge", repo_path(repo)),
                Some(&MergeBody {
                    sha,
                    merge_method: method.to_string(),
                }),
            )
            .await?;

        let merge_result = MergeResult::from(result);
        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }
}
