//! Policy orchestration: gate, then merge

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::merge::execute::merge;
use crate::merge::gate::evaluate_merge;
use crate::platform::PlatformService;
use crate::types::PullRequest;
use tracing::{debug, info, warn};

/// Turn a recoverable error into a "not eligible" verdict; propagate the rest
fn absorb(pr_number: u64, err: Error) -> Result<bool> {
    if !err.is_recoverable() {
        return Err(err);
    }

    if let Error::Config(e) = &err {
        warn!(pr_number, error = %e, "skipping: invalid configuration");
    } else {
        debug!(pr_number, reason = %err, "skipping: merge check failed");
    }
    Ok(false)
}

/// Check whether a given pull request should be merged, and merge it.
///
/// Configuration is resolved once for the PR's repository and stays fixed for
/// the whole evaluation. Returns `true` if the PR got merged.
pub async fn check_merge(
    platform: &dyn PlatformService,
    settings: &Settings,
    pr: &PullRequest,
) -> Result<bool> {
    let number = pr.number;
    info!(pr_number = number, repo = %pr.base_repo, "checking merge");

    let config = match settings.resolve(&pr.base_repo) {
        Ok(config) => config,
        Err(e) => return absorb(number, e.into()),
    };

    let eligibility = match evaluate_merge(platform, pr, &config).await {
        Ok(eligibility) => eligibility,
        Err(e) => return absorb(number, e),
    };

    if !eligibility.is_eligible() {
        info!(pr_number = number, %eligibility, "skipping: merge rejected");
        return Ok(false);
    }

    let merged = merge(platform, pr, config.merge_method).await;
    if merged {
        info!(pr_number = number, "merged");
    } else {
        info!(pr_number = number, "skipping: failed to merge");
    }

    Ok(merged)
}
