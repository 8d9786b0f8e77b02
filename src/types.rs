//! Core types for merge-me
//!
//! Everything here is a read snapshot of GitHub state taken during a single
//! evaluation. Nothing is persisted between evaluations.

use serde::{Deserialize, Serialize};

/// Kind of account owning a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OwnerKind {
    /// A personal account
    User,
    /// An organization (has teams)
    Organization,
    /// Payload did not say
    #[default]
    Unknown,
}

/// A repository identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Owner login (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Owner account kind
    pub owner_kind: OwnerKind,
}

impl Repository {
    /// Create a repository reference with an unknown owner kind
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            owner_kind: OwnerKind::Unknown,
        }
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Whether the owner is known to be a personal account
    pub fn is_user_owned(&self) -> bool {
        self.owner_kind == OwnerKind::User
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A team requested for review on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedTeam {
    /// Display name
    pub name: String,
    /// URL slug, used for membership lookups
    pub slug: String,
}

/// A pull request snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Whether PR is a draft
    pub is_draft: bool,
    /// Whether PR was already merged
    pub is_merged: bool,
    /// Whether GitHub can create a merge commit
    /// - `None` = unknown (GitHub still computing)
    pub mergeable: Option<bool>,
    /// Whether GitHub can rebase the PR onto its base
    /// - `None` = unknown (GitHub still computing)
    pub rebaseable: Option<bool>,
    /// Head branch name
    pub head_ref: String,
    /// Head commit SHA
    pub head_sha: String,
    /// Source repository (`None` if the fork was deleted)
    pub head_repo: Option<Repository>,
    /// Base branch name
    pub base_ref: String,
    /// Target repository
    pub base_repo: Repository,
    /// Logins of requested reviewers
    pub requested_reviewers: Vec<String>,
    /// Requested review teams
    pub requested_teams: Vec<RequestedTeam>,
}

impl PullRequest {
    /// Whether source and target repository differ (fork PR).
    ///
    /// A PR whose source repository is gone counts as cross-origin.
    pub fn is_cross_origin(&self) -> bool {
        self.head_repo
            .as_ref()
            .is_none_or(|head| head.full_name() != self.base_repo.full_name())
    }
}

/// Review verdict state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Approved
    Approved,
    /// Changes requested
    ChangesRequested,
    /// Comment only
    Commented,
    /// Review dismissed
    Dismissed,
    /// Review not yet submitted
    Pending,
    /// Anything GitHub adds later
    #[serde(other)]
    Other,
}

/// One submitted review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer login
    pub user: String,
    /// Verdict
    pub state: ReviewState,
}

impl Review {
    /// Create a review
    pub fn new(user: impl Into<String>, state: ReviewState) -> Self {
        Self {
            user: user.into(),
            state,
        }
    }
}

/// Lifecycle status of a check suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteStatus {
    /// Waiting to run
    Queued,
    /// Running
    InProgress,
    /// Finished, conclusion available
    Completed,
    /// Anything else (e.g. `requested`, `waiting`)
    #[serde(other)]
    Other,
}

/// A check suite reported against a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSuite {
    /// Lifecycle status
    pub status: SuiteStatus,
    /// Conclusion (only meaningful once completed)
    pub conclusion: Option<String>,
    /// Numbers of the pull requests this suite is associated with
    pub pull_requests: Vec<u64>,
}

impl CheckSuite {
    /// Whether the suite has finished
    pub fn is_completed(&self) -> bool {
        self.status == SuiteStatus::Completed
    }

    /// Whether the suite reported the given conclusion
    pub fn has_conclusion(&self, conclusion: &str) -> bool {
        self.conclusion.as_deref() == Some(conclusion)
    }
}

/// A single named commit status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusContext {
    /// Status context name (e.g. `ci/travis`)
    pub context: String,
    /// State (`success`, `pending`, `failure`, `error`)
    pub state: String,
}

/// Combined commit status for a SHA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// Aggregate state as reported by GitHub
    pub state: String,
    /// Individual status contexts
    pub statuses: Vec<StatusContext>,
}

/// Result of probing branch protection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchProtection {
    /// Branch has protection rules; GitHub enforces them at merge time
    Protected,
    /// Branch has no protection rules
    Unprotected,
    /// Protection state could not be determined
    Unknown(String),
}

impl std::fmt::Display for BranchProtection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protected => write!(f, "protected"),
            Self::Unprotected => write!(f, "unprotected"),
            Self::Unknown(cause) => write!(f, "unknown ({cause})"),
        }
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Rebase commits onto base branch
    #[default]
    Rebase,
    /// Create a merge commit
    Merge,
}

impl MergeMethod {
    /// Whether the PR reports it cannot be merged with this method.
    ///
    /// Unknown capability (`None`) never blocks.
    pub const fn is_blocked_by(self, pr: &PullRequest) -> bool {
        let capability = match self {
            Self::Rebase => pr.rebaseable,
            Self::Merge => pr.mergeable,
        };
        matches!(capability, Some(false))
    }
}

impl std::str::FromStr for MergeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rebase" => Ok(Self::Rebase),
            "merge" => Ok(Self::Merge),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rebase => write!(f, "rebase"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// Result of a merge operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Review aggregation verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewApproval {
    /// Enough approvals, no change requests
    Approved,
    /// Below the required approval count (overall or for a team)
    ReviewsMissing,
    /// At least one reviewer requests changes
    ChangesRequested,
}

impl std::fmt::Display for ReviewApproval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "APPROVED"),
            Self::ReviewsMissing => write!(f, "REVIEWS_MISSING"),
            Self::ChangesRequested => write!(f, "CHANGES_REQUESTED"),
        }
    }
}

/// Status aggregation verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusApproval {
    /// All statuses and relevant checks passed
    Success,
    /// Combined commit status is not successful (upper-cased state)
    Status(String),
    /// Neither statuses nor relevant checks exist
    ChecksMissing,
    /// A relevant check suite has not completed
    ChecksPending,
    /// A relevant check suite completed without success
    ChecksFailed,
}

impl std::fmt::Display for StatusApproval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Status(state) => write!(f, "STATUS_{state}"),
            Self::ChecksMissing => write!(f, "CHECKS_MISSING"),
            Self::ChecksPending => write!(f, "CHECKS_PENDING"),
            Self::ChecksFailed => write!(f, "CHECKS_FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(head_repo: Option<Repository>) -> PullRequest {
        PullRequest {
            number: 1,
            is_draft: false,
            is_merged: false,
            mergeable: None,
            rebaseable: Some(false),
            head_ref: "feature".to_string(),
            head_sha: "abc".to_string(),
            head_repo,
            base_ref: "main".to_string(),
            base_repo: Repository::new("acme", "widgets"),
            requested_reviewers: vec![],
            requested_teams: vec![],
        }
    }

    #[test]
    fn test_cross_origin_detection() {
        assert!(!pr(Some(Repository::new("acme", "widgets"))).is_cross_origin());
        assert!(pr(Some(Repository::new("fork", "widgets"))).is_cross_origin());
        assert!(pr(None).is_cross_origin());
    }

    #[test]
    fn test_merge_method_capability() {
        let pr = pr(None);
        // rebaseable explicitly false blocks rebase, unknown mergeable does not block merge
        assert!(MergeMethod::Rebase.is_blocked_by(&pr));
        assert!(!MergeMethod::Merge.is_blocked_by(&pr));
    }

    #[test]
    fn test_status_approval_display() {
        assert_eq!(
            StatusApproval::Status("FAILURE".into()).to_string(),
            "STATUS_FAILURE"
        );
        assert_eq!(StatusApproval::ChecksMissing.to_string(), "CHECKS_MISSING");
    }

    #[test]
    fn test_merge_method_parse() {
        assert_eq!("rebase".parse::<MergeMethod>(), Ok(MergeMethod::Rebase));
        assert_eq!("merge".parse::<MergeMethod>(), Ok(MergeMethod::Merge));
        assert!("squash".parse::<MergeMethod>().is_err());
    }
}
