//! Webhook events
//!
//! Parses the GitHub events that can make a PR mergeable and decides what a
//! given event should trigger. No I/O happens here; [`crate::bot::MergeBot`]
//! carries out the [`Trigger`].

use crate::error::Result;
use crate::payload::{PullRequestPayload, PullRequestRef, RepositoryPayload};
use crate::types::{PullRequest, Repository};
use serde::Deserialize;

/// PR actions that warrant an evaluation
const PULL_REQUEST_ACTIONS: [&str; 4] = ["opened", "reopened", "synchronize", "ready_for_review"];

/// A branch listed in a `status` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBranch {
    /// Branch name
    pub name: String,
    /// Head commit of the branch
    pub sha: String,
}

/// A parsed webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `pull_request.*`
    PullRequest {
        /// Event action
        action: String,
        /// Embedded pull request
        pull_request: Box<PullRequest>,
    },
    /// `pull_request_review.*`
    PullRequestReview {
        /// Event action
        action: String,
        /// Review state, lower case (`approved`, `commented`, ...)
        state: String,
        /// Repository
        repo: Repository,
        /// PR number
        number: u64,
    },
    /// `check_suite.*`
    CheckSuite {
        /// Event action
        action: String,
        /// Suite conclusion
        conclusion: Option<String>,
        /// Repository
        repo: Repository,
        /// Associated PR numbers
        pull_requests: Vec<u64>,
    },
    /// `status`
    Status {
        /// Commit the status was reported for
        sha: String,
        /// Status state
        state: String,
        /// Repository
        repo: Repository,
        /// Branches containing the commit
        branches: Vec<StatusBranch>,
    },
    /// Anything else; observed but never evaluated
    Other {
        /// Event name, with action if present
        name: String,
    },
}

/// What an event asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger<'a> {
    /// Evaluate the PR carried by the event
    Evaluate(&'a PullRequest),
    /// Re-fetch the PR by number, then evaluate
    Fetch {
        /// Repository
        repo: &'a Repository,
        /// PR number
        number: u64,
    },
    /// Find the open PR with this head (`owner:branch`), re-fetch, evaluate
    FindByHead {
        /// Repository
        repo: &'a Repository,
        /// Head filter
        head: String,
    },
    /// Nothing to do
    Skip(String),
}

#[derive(Deserialize)]
struct PullRequestEventPayload {
    action: String,
    pull_request: PullRequestPayload,
}

#[derive(Deserialize)]
struct ReviewStatePayload {
    state: String,
}

#[derive(Deserialize)]
struct ReviewEventPayload {
    action: String,
    review: ReviewStatePayload,
    pull_request: PullRequestRef,
    repository: RepositoryPayload,
}

#[derive(Deserialize)]
struct CheckSuiteBody {
    conclusion: Option<String>,
    #[serde(default)]
    pull_requests: Vec<PullRequestRef>,
}

#[derive(Deserialize)]
struct CheckSuiteEventPayload {
    action: String,
    check_suite: CheckSuiteBody,
    repository: RepositoryPayload,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct BranchRef {
    name: String,
    commit: CommitRef,
}

#[derive(Deserialize)]
struct StatusEventPayload {
    sha: String,
    state: String,
    #[serde(default)]
    branches: Vec<BranchRef>,
    repository: RepositoryPayload,
}

#[derive(Deserialize)]
struct AnyEventPayload {
    action: Option<String>,
}

impl Event {
    /// Parse a webhook delivery.
    ///
    /// `name` is the `X-GitHub-Event` header value.
    pub fn from_webhook(name: &str, payload: &[u8]) -> Result<Self> {
        let event = match name {
            "pull_request" => {
                let p: PullRequestEventPayload = serde_json::from_slice(payload)?;
                Self::PullRequest {
                    action: p.action,
                    pull_request: Box::new(p.pull_request.try_into()?),
                }
            }
            "pull_request_review" => {
                let p: ReviewEventPayload = serde_json::from_slice(payload)?;
                Self::PullRequestReview {
                    action: p.action,
                    state: p.review.state.to_lowercase(),
                    repo: p.repository.into(),
                    number: p.pull_request.number,
                }
            }
            "check_suite" => {
                let p: CheckSuiteEventPayload = serde_json::from_slice(payload)?;
                Self::CheckSuite {
                    action: p.action,
                    conclusion: p.check_suite.conclusion,
                    repo: p.repository.into(),
                    pull_requests: p
                        .check_suite
                        .pull_requests
                        .into_iter()
                        .map(|pr| pr.number)
                        .collect(),
                }
            }
            "status" => {
                let p: StatusEventPayload = serde_json::from_slice(payload)?;
                Self::Status {
                    sha: p.sha,
                    state: p.state,
                    repo: p.repository.into(),
                    branches: p
                        .branches
                        .into_iter()
                        .map(|b| StatusBranch {
                            name: b.name,
                            sha: b.commit.sha,
                        })
                        .collect(),
                }
            }
            other => {
                let action = serde_json::from_slice::<AnyEventPayload>(payload)
                    .ok()
                    .and_then(|p| p.action);
                Self::Other {
                    name: action.map_or_else(|| other.to_string(), |a| format!("{other}.{a}")),
                }
            }
        };

        Ok(event)
    }

    /// Event name with action, e.g. `pull_request.opened`
    pub fn name(&self) -> String {
        match self {
            Self::PullRequest { action, .. } => format!("pull_request.{action}"),
            Self::PullRequestReview { action, .. } => format!("pull_request_review.{action}"),
            Self::CheckSuite { action, .. } => format!("check_suite.{action}"),
            Self::Status { .. } => "status".to_string(),
            Self::Other { name } => name.clone(),
        }
    }

    /// Decide what this event should trigger
    pub fn trigger(&self) -> Trigger<'_> {
        match self {
            Self::PullRequest {
                action,
                pull_request,
            } => {
                if PULL_REQUEST_ACTIONS.contains(&action.as_str()) {
                    Trigger::Evaluate(pull_request)
                } else {
                    Trigger::Skip(format!("pull_request action {action}"))
                }
            }
            Self::PullRequestReview {
                action,
                state,
                repo,
                number,
            } => {
                if action != "submitted" {
                    Trigger::Skip(format!("pull_request_review action {action}"))
                } else if state != "approved" {
                    Trigger::Skip(format!("review in state {state}"))
                } else {
                    Trigger::Fetch {
                        repo,
                        number: *number,
                    }
                }
            }
            Self::CheckSuite {
                action,
                conclusion,
                repo,
                pull_requests,
            } => {
                if action != "completed" {
                    return Trigger::Skip(format!("check_suite action {action}"));
                }
                if conclusion.as_deref() != Some("success") {
                    return Trigger::Skip(format!(
                        "check_suite conclusion == {}",
                        conclusion.as_deref().unwrap_or("none")
                    ));
                }
                pull_requests.first().map_or_else(
                    || Trigger::Skip("check_suite has no pull requests".to_string()),
                    |number| Trigger::Fetch {
                        repo,
                        number: *number,
                    },
                )
            }
            Self::Status {
                sha,
                state,
                repo,
                branches,
            } => {
                if state != "success" {
                    return Trigger::Skip(format!("status == {state}"));
                }
                branches.iter().find(|branch| branch.sha == *sha).map_or_else(
                    || Trigger::Skip("no branch matches ref".to_string()),
                    |branch| Trigger::FindByHead {
                        repo,
                        head: format!("{}:{}", repo.owner, branch.name),
                    },
                )
            }
            Self::Other { name } => Trigger::Skip(format!("unhandled event {name}")),
        }
    }
}
