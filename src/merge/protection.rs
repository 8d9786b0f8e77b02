//! Branch protection probe

use crate::platform::PlatformService;
use crate::types::{BranchProtection, PullRequest};
use tracing::error;

/// Returns whether the PR's base branch is protected.
///
/// Never guesses: any failure other than "not protected" comes back as
/// [`BranchProtection::Unknown`].
pub async fn is_branch_protected(
    platform: &dyn PlatformService,
    pr: &PullRequest,
) -> BranchProtection {
    match platform
        .get_branch_protection(&pr.base_repo, &pr.base_ref)
        .await
    {
        Ok(protection) => protection,
        Err(e) => {
            error!(
                repo = %pr.base_repo,
                branch = %pr.base_ref,
                error = %e,
                "failed to fetch branch protection status"
            );
            BranchProtection::Unknown(e.to_string())
        }
    }
}
