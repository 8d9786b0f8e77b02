//! Platform service for GitHub
//!
//! Every remote read and the final merge go through [`PlatformService`], so
//! policy code can be exercised against a scripted fake.

mod github;

pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    BranchProtection, CheckSuite, CombinedStatus, MergeMethod, MergeResult, PullRequest,
    Repository, Review,
};
use async_trait::async_trait;

/// Platform service trait for the calls the merge policy needs
///
/// All methods except [`merge_pr`](Self::merge_pr) are read-only. Each call is
/// a suspension point; implementations must not cache across calls.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Get branch protection state for a branch.
    ///
    /// Returns `Protected` or `Unprotected`. Failures other than "not
    /// protected" are returned as errors.
    async fn get_branch_protection(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<BranchProtection>;

    /// Get the combined commit status for a SHA
    async fn get_combined_status(&self, repo: &Repository, sha: &str) -> Result<CombinedStatus>;

    /// List check suites reported for a SHA
    async fn list_check_suites(&self, repo: &Repository, sha: &str) -> Result<Vec<CheckSuite>>;

    /// List reviews of a PR in submission order (oldest first)
    async fn list_reviews(&self, repo: &Repository, pr_number: u64) -> Result<Vec<Review>>;

    /// Check whether a user is a collaborator on the repository.
    ///
    /// A "not found" response yields `Ok(false)`.
    async fn is_collaborator(&self, repo: &Repository, username: &str) -> Result<bool>;

    /// List member logins of an organization team.
    ///
    /// Missing permission or a non-organization owner yields
    /// [`Error::MergeCheck`](crate::error::Error::MergeCheck).
    async fn list_team_members(&self, org: &str, team_slug: &str) -> Result<Vec<String>>;

    /// List open PRs whose head matches `owner:branch`
    async fn find_open_prs(&self, repo: &Repository, head: &str) -> Result<Vec<PullRequest>>;

    /// Get full PR details
    async fn get_pr(&self, repo: &Repository, pr_number: u64) -> Result<PullRequest>;

    /// Merge a PR, pinned to the given head SHA
    async fn merge_pr(
        &self,
        repo: &Repository,
        pr_number: u64,
        sha: &str,
        method: MergeMethod,
    ) -> Result<MergeResult>;
}
