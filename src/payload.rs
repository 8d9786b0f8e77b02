//! GitHub wire types
//!
//! Only the fields we read are declared; serde ignores the rest. The same
//! pull request shape is used by the REST API and by webhook payloads.

use crate::error::{Error, Result};
use crate::types::{
    CheckSuite, CombinedStatus, MergeResult, OwnerKind, PullRequest, Repository, RequestedTeam,
    Review, ReviewState, StatusContext, SuiteStatus,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserPayload {
    pub login: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl UserPayload {
    fn owner_kind(&self) -> OwnerKind {
        match self.kind.as_deref() {
            Some("Organization") => OwnerKind::Organization,
            Some("User") => OwnerKind::User,
            _ => OwnerKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RepositoryPayload {
    pub name: String,
    pub owner: UserPayload,
}

impl From<RepositoryPayload> for Repository {
    fn from(repo: RepositoryPayload) -> Self {
        Self {
            owner_kind: repo.owner.owner_kind(),
            owner: repo.owner.login,
            name: repo.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BranchPayload {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    pub repo: Option<RepositoryPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TeamPayload {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PullRequestPayload {
    pub number: u64,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub rebaseable: Option<bool>,
    pub head: BranchPayload,
    pub base: BranchPayload,
    #[serde(default)]
    pub requested_reviewers: Option<Vec<UserPayload>>,
    #[serde(default)]
    pub requested_teams: Option<Vec<TeamPayload>>,
}

impl TryFrom<PullRequestPayload> for PullRequest {
    type Error = Error;

    fn try_from(pr: PullRequestPayload) -> Result<Self> {
        let base_repo = pr.base.repo.ok_or_else(|| {
            Error::GitHubApi(format!("PR #{} is missing its base repository", pr.number))
        })?;

        Ok(Self {
            number: pr.number,
            is_draft: pr.draft.unwrap_or(false),
            is_merged: pr.merged.unwrap_or(false) || pr.merged_at.is_some(),
            mergeable: pr.mergeable,
            rebaseable: pr.rebaseable,
            head_ref: pr.head.ref_name,
            head_sha: pr.head.sha,
            head_repo: pr.head.repo.map(Repository::from),
            base_ref: pr.base.ref_name,
            base_repo: base_repo.into(),
            requested_reviewers: pr
                .requested_reviewers
                .unwrap_or_default()
                .into_iter()
                .map(|u| u.login)
                .collect(),
            requested_teams: pr
                .requested_teams
                .unwrap_or_default()
                .into_iter()
                .map(|t| RequestedTeam {
                    name: t.name,
                    slug: t.slug,
                })
                .collect(),
        })
    }
}

/// Shallow PR reference (check suite payloads, PR list items)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PullRequestRef {
    pub number: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReviewPayload {
    pub user: Option<UserPayload>,
    pub state: ReviewState,
}

impl ReviewPayload {
    /// Reviews from deleted accounts have no user and are dropped
    pub fn into_review(self) -> Option<Review> {
        self.user.map(|user| Review {
            user: user.login,
            state: self.state,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusContextPayload {
    pub context: String,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CombinedStatusPayload {
    pub state: String,
    #[serde(default)]
    pub statuses: Vec<StatusContextPayload>,
}

impl From<CombinedStatusPayload> for CombinedStatus {
    fn from(status: CombinedStatusPayload) -> Self {
        Self {
            state: status.state,
            statuses: status
                .statuses
                .into_iter()
                .map(|s| StatusContext {
                    context: s.context,
                    state: s.state,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CheckSuitePayload {
    pub status: Option<SuiteStatus>,
    pub conclusion: Option<String>,
    #[serde(default)]
    pub pull_requests: Option<Vec<PullRequestRef>>,
}

impl From<CheckSuitePayload> for CheckSuite {
    fn from(suite: CheckSuitePayload) -> Self {
        Self {
            status: suite.status.unwrap_or(SuiteStatus::Other),
            conclusion: suite.conclusion,
            pull_requests: suite
                .pull_requests
                .unwrap_or_default()
                .into_iter()
                .map(|pr| pr.number)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CheckSuitesPayload {
    pub check_suites: Vec<CheckSuitePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MergeResponsePayload {
    pub merged: bool,
    pub sha: Option<String>,
    pub message: Option<String>,
}

impl From<MergeResponsePayload> for MergeResult {
    fn from(result: MergeResponsePayload) -> Self {
        Self {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        }
    }
}
