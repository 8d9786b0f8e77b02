//! Status aggregation
//!
//! A PR only counts as green if commit statuses or check suites exist, and
//! every one of them that matters has succeeded.

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{CheckSuite, PullRequest, StatusApproval, SuiteStatus};
use tracing::debug;

/// Whether a check suite should take part in the verdict.
///
/// Queued suites that are not associated with this PR come from apps that
/// watch every push (dependency bots and the like) and never complete for
/// it. Neutral conclusions do not block.
pub fn is_relevant_suite(suite: &CheckSuite, pr_number: u64) -> bool {
    if suite.status == SuiteStatus::Queued && !suite.pull_requests.contains(&pr_number) {
        return false;
    }

    !(suite.is_completed() && suite.has_conclusion("neutral"))
}

/// Fold one suite into the running verdict. The first non-success sticks.
pub fn combine_suite_status(
    status: Option<StatusApproval>,
    suite: &CheckSuite,
) -> Option<StatusApproval> {
    if let Some(status) = status
        && status != StatusApproval::Success
    {
        return Some(status);
    }

    if !suite.is_completed() {
        return Some(StatusApproval::ChecksPending);
    }

    if !suite.has_conclusion("success") {
        return Some(StatusApproval::ChecksFailed);
    }

    Some(StatusApproval::Success)
}

/// Return the status approval state for a given pull request.
pub async fn status_approval(
    platform: &dyn PlatformService,
    pr: &PullRequest,
) -> Result<StatusApproval> {
    let repo = &pr.base_repo;
    let sha = pr.head_sha.as_str();

    let combined = platform.get_combined_status(repo, sha).await?;
    let state = combined.state.to_uppercase();

    // quick reject on unsuccessful commit statuses
    if !combined.statuses.is_empty() && state != "SUCCESS" {
        debug!(pr_number = pr.number, %state, "skipping: combined status not successful");
        return Ok(StatusApproval::Status(state));
    }

    let suites = platform.list_check_suites(repo, sha).await?;
    let relevant: Vec<&CheckSuite> = suites
        .iter()
        .filter(|suite| is_relevant_suite(suite, pr.number))
        .collect();

    debug!(
        pr_number = pr.number,
        statuses = combined.statuses.len(),
        suites = suites.len(),
        relevant = relevant.len(),
        "aggregating statuses and checks"
    );

    if relevant.is_empty() {
        return Ok(if combined.statuses.is_empty() {
            StatusApproval::ChecksMissing
        } else {
            StatusApproval::Success
        });
    }

    Ok(relevant
        .into_iter()
        .fold(None, combine_suite_status)
        .unwrap_or(StatusApproval::ChecksMissing))
}
