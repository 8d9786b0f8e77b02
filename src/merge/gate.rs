//! Merge eligibility gate
//!
//! Checks run cheapest first: PR flags from the snapshot, then branch
//! protection, then statuses, then reviews.

use crate::config::AppConfig;
use crate::error::Result;
use crate::merge::protection::is_branch_protected;
use crate::merge::reviews::review_approval;
use crate::merge::status::status_approval;
use crate::platform::PlatformService;
use crate::types::{
    BranchProtection, MergeMethod, PullRequest, ReviewApproval, StatusApproval,
};
use tracing::{debug, info};

/// Why a PR may be merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibleReason {
    /// Base branch is protected; GitHub enforces its rules when we merge
    BranchProtected,
    /// Statuses and reviews satisfy the configured policy
    PolicySatisfied,
}

/// Why a PR may not be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// PR is a draft
    Draft,
    /// PR is already merged
    AlreadyMerged,
    /// Rebase method configured but PR cannot be rebased
    NotRebaseable,
    /// Merge method configured but PR has conflicts
    NotMergeable,
    /// Branch protection could not be determined
    ProtectionUnknown(String),
    /// Statuses or checks are not green
    Status(StatusApproval),
    /// Reviews do not satisfy the policy
    Reviews(ReviewApproval),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "PR is a draft"),
            Self::AlreadyMerged => write!(f, "PR is already merged"),
            Self::NotRebaseable => write!(f, "PR cannot be rebased"),
            Self::NotMergeable => write!(f, "PR has merge conflicts"),
            Self::ProtectionUnknown(cause) => {
                write!(f, "branch protection status unknown: {cause}")
            }
            Self::Status(status) => write!(f, "failed status check ({status})"),
            Self::Reviews(reviews) => write!(f, "failed review check ({reviews})"),
        }
    }
}

/// Outcome of the eligibility gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// PR may be merged
    Eligible(EligibleReason),
    /// PR must not be merged
    Rejected(Rejection),
}

impl Eligibility {
    /// Whether a merge should be attempted
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible(_))
    }
}

impl std::fmt::Display for Eligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eligible(EligibleReason::BranchProtected) => {
                write!(f, "eligible (branch protected, GitHub enforces rules)")
            }
            Self::Eligible(EligibleReason::PolicySatisfied) => {
                write!(f, "eligible (statuses and reviews pass)")
            }
            Self::Rejected(rejection) => write!(f, "rejected: {rejection}"),
        }
    }
}

fn method_rejection(method: MergeMethod) -> Rejection {
    match method {
        MergeMethod::Rebase => Rejection::NotRebaseable,
        MergeMethod::Merge => Rejection::NotMergeable,
    }
}

/// Evaluate whether the pull request can be merged, with the reason.
pub async fn evaluate_merge(
    platform: &dyn PlatformService,
    pr: &PullRequest,
    config: &AppConfig,
) -> Result<Eligibility> {
    let number = pr.number;

    if pr.is_draft {
        info!(pr_number = number, "skipping: PR is a draft");
        return Ok(Eligibility::Rejected(Rejection::Draft));
    }

    if pr.is_merged {
        info!(pr_number = number, "skipping: PR is already merged");
        return Ok(Eligibility::Rejected(Rejection::AlreadyMerged));
    }

    if config.merge_method.is_blocked_by(pr) {
        let rejection = method_rejection(config.merge_method);
        info!(pr_number = number, method = %config.merge_method, "skipping: {rejection}");
        return Ok(Eligibility::Rejected(rejection));
    }

    match is_branch_protected(platform, pr).await {
        BranchProtection::Unknown(cause) => {
            return Ok(Eligibility::Rejected(Rejection::ProtectionUnknown(cause)));
        }
        BranchProtection::Protected => {
            // we always attempt to merge into protected branches;
            // GitHub enforces the protection and our merge will fail
            debug!(pr_number = number, "branch is protected, skipping merge check");
            return Ok(Eligibility::Eligible(EligibleReason::BranchProtected));
        }
        BranchProtection::Unprotected => {}
    }

    debug!(pr_number = number, "checking status and reviews");

    let status = status_approval(platform, pr).await?;
    if status != StatusApproval::Success {
        info!(pr_number = number, %status, "skipping: failed status check");
        return Ok(Eligibility::Rejected(Rejection::Status(status)));
    }

    let reviews = platform.list_reviews(&pr.base_repo, number).await?;
    let approval = review_approval(platform, pr, &reviews, config).await?;
    if approval != ReviewApproval::Approved {
        info!(pr_number = number, %approval, "skipping: failed review check");
        return Ok(Eligibility::Rejected(Rejection::Reviews(approval)));
    }

    debug!(pr_number = number, "PR check passed");
    Ok(Eligibility::Eligible(EligibleReason::PolicySatisfied))
}

/// Check whether the pull request can be merged.
pub async fn can_merge(
    platform: &dyn PlatformService,
    pr: &PullRequest,
    config: &AppConfig,
) -> Result<bool> {
    Ok(evaluate_merge(platform, pr, config).await?.is_eligible())
}
