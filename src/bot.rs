//! Event-driven merge bot
//!
//! Owns the platform handle and settings, and turns webhook events into merge
//! checks.

use crate::config::Settings;
use crate::error::Result;
use crate::events::{Event, Trigger};
use crate::merge;
use crate::platform::PlatformService;
use crate::types::PullRequest;
use std::sync::Arc;
use tracing::{debug, info};

/// Merge bot: evaluates PRs and merges the eligible ones
pub struct MergeBot {
    platform: Arc<dyn PlatformService>,
    settings: Settings,
}

impl MergeBot {
    /// Create a bot over the given platform and settings
    pub fn new(platform: Arc<dyn PlatformService>, settings: Settings) -> Self {
        Self { platform, settings }
    }

    /// Platform handle
    pub fn platform(&self) -> &dyn PlatformService {
        self.platform.as_ref()
    }

    /// Loaded settings
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Evaluate a PR and merge it if eligible. Returns whether it merged.
    pub async fn check_merge(&self, pr: &PullRequest) -> Result<bool> {
        merge::check_merge(self.platform.as_ref(), &self.settings, pr).await
    }

    /// Handle a webhook event.
    ///
    /// Returns `None` when the event does not concern a mergeable PR, otherwise
    /// whether the PR it points at got merged.
    pub async fn handle_event(&self, event: &Event) -> Result<Option<bool>> {
        let name = event.name();

        let pr = match event.trigger() {
            Trigger::Skip(reason) => {
                debug!(event = %name, %reason, "ignoring event");
                return Ok(None);
            }
            Trigger::Evaluate(pr) => {
                info!(event = %name, pr_number = pr.number, "evaluating PR from event");
                return self.check_merge(pr).await.map(Some);
            }
            Trigger::Fetch { repo, number } => {
                info!(event = %name, pr_number = number, "fetching PR");
                self.platform.get_pr(repo, number).await?
            }
            Trigger::FindByHead { repo, head } => {
                let open = self.platform.find_open_prs(repo, &head).await?;
                let Some(found) = open.into_iter().next() else {
                    debug!(event = %name, %head, "no open PR for branch");
                    return Ok(None);
                };
                info!(event = %name, pr_number = found.number, %head, "fetching PR");
                self.platform.get_pr(repo, found.number).await?
            }
        };

        self.check_merge(&pr).await.map(Some)
    }
}
