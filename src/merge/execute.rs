//! Merge execution - effectful operations
//!
//! Issues the merge call for an eligible PR. The outcome collapses to
//! "merged" or "not merged"; the failure kind only feeds the logs.

use crate::error::Error;
use crate::platform::PlatformService;
use crate::types::{MergeMethod, PullRequest};
use tracing::{debug, error};

/// Classified merge failure, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFailure {
    /// 405: GitHub refused (protection rules, not mergeable, ...)
    NotAllowed,
    /// 404: PR or repository vanished
    NotFound,
    /// 409: head moved since evaluation
    Conflict,
    /// Anything else
    Other,
}

impl std::fmt::Display for MergeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAllowed => write!(f, "not allowed"),
            Self::NotFound => write!(f, "not found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Classify an error returned by the merge call
pub fn classify_merge_error(err: &Error) -> MergeFailure {
    let Error::Octocrab(octocrab::Error::GitHub { source, .. }) = err else {
        return MergeFailure::Other;
    };

    match source.status_code.as_u16() {
        405 => MergeFailure::NotAllowed,
        404 => MergeFailure::NotFound,
        409 => MergeFailure::Conflict,
        _ => MergeFailure::Other,
    }
}

/// Remote status code and message of a failed merge call.
///
/// Non-GitHub errors carry no status; their debug form stands in for the
/// message.
pub fn merge_error_detail(err: &Error) -> (Option<u16>, String) {
    match err {
        Error::Octocrab(octocrab::Error::GitHub { source, .. }) => {
            (Some(source.status_code.as_u16()), source.message.clone())
        }
        other => (None, format!("{other:?}")),
    }
}

/// Attempt to merge the given pull request (EFFECTFUL).
///
/// The merge is pinned to the evaluated head SHA so a branch that advanced in
/// the meantime is not merged. Returns whether the merge happened; failures
/// are never retried here.
pub async fn merge(platform: &dyn PlatformService, pr: &PullRequest, method: MergeMethod) -> bool {
    let number = pr.number;
    debug!(pr_number = number, sha = %pr.head_sha, %method, "attempting to merge");

    match platform
        .merge_pr(&pr.base_repo, number, &pr.head_sha, method)
        .await
    {
        Ok(result) if result.merged => {
            debug!(pr_number = number, sha = ?result.sha, "merged");
            true
        }
        Ok(result) => {
            debug!(pr_number = number, message = ?result.message, "merge not performed");
            false
        }
        Err(e) => {
            let failure = classify_merge_error(&e);
            let (status, message) = merge_error_detail(&e);
            if failure == MergeFailure::NotAllowed {
                debug!(pr_number = number, %failure, ?status, %message, "merge failed");
            } else {
                error!(pr_number = number, %failure, ?status, %message, "merge failed");
            }
            false
        }
    }
}
