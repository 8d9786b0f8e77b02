//! Shared fixtures for merge-me tests

#![allow(dead_code)]

pub mod mock_platform;

pub use mock_platform::{Call, MockPlatformService, Reply};

use merge_me::config::{AppConfig, Settings};
use merge_me::types::{
    CheckSuite, CombinedStatus, MergeResult, OwnerKind, PullRequest, Repository, RequestedTeam,
    Review, ReviewState, StatusContext, SuiteStatus,
};

/// `owner/name` of the fixture repository
pub const REPO: &str = "acme/widgets";

/// Head SHA of fixture PRs
pub const HEAD_SHA: &str = "abc123";

/// Organization-owned fixture repository
pub fn repo() -> Repository {
    Repository {
        owner_kind: OwnerKind::Organization,
        ..Repository::new("acme", "widgets")
    }
}

/// Fork of the fixture repository
pub fn fork() -> Repository {
    Repository {
        owner_kind: OwnerKind::User,
        ..Repository::new("contributor", "widgets")
    }
}

/// Open, mergeable, same-repository PR from `feature` into `main`
pub fn make_pr(number: u64) -> PullRequest {
    PullRequest {
        number,
        is_draft: false,
        is_merged: false,
        mergeable: Some(true),
        rebaseable: Some(true),
        head_ref: "feature".to_string(),
        head_sha: HEAD_SHA.to_string(),
        head_repo: Some(repo()),
        base_ref: "main".to_string(),
        base_repo: repo(),
        requested_reviewers: Vec::new(),
        requested_teams: Vec::new(),
    }
}

/// Requested team with matching name and slug
pub fn team(slug: &str) -> RequestedTeam {
    RequestedTeam {
        name: slug.to_string(),
        slug: slug.to_string(),
    }
}

pub fn approved(user: &str) -> Review {
    Review::new(user, ReviewState::Approved)
}

pub fn changes_requested(user: &str) -> Review {
    Review::new(user, ReviewState::ChangesRequested)
}

pub fn commented(user: &str) -> Review {
    Review::new(user, ReviewState::Commented)
}

pub fn suite(status: SuiteStatus, conclusion: Option<&str>, prs: &[u64]) -> CheckSuite {
    CheckSuite {
        status,
        conclusion: conclusion.map(ToString::to_string),
        pull_requests: prs.to_vec(),
    }
}

/// Completed suite associated with `pr`
pub fn completed(conclusion: &str, pr: u64) -> CheckSuite {
    suite(SuiteStatus::Completed, Some(conclusion), &[pr])
}

pub fn combined(state: &str, statuses: &[(&str, &str)]) -> CombinedStatus {
    CombinedStatus {
        state: state.to_string(),
        statuses: statuses
            .iter()
            .map(|(context, state)| StatusContext {
                context: (*context).to_string(),
                state: (*state).to_string(),
            })
            .collect(),
    }
}

/// Combined status with no commit statuses reported
pub fn no_statuses() -> CombinedStatus {
    combined("pending", &[])
}

pub fn merged(sha: &str) -> MergeResult {
    MergeResult {
        merged: true,
        sha: Some(sha.to_string()),
        message: Some("Pull Request successfully merged".to_string()),
    }
}

/// Policy without the collaborator filter, so scripts stay short
pub fn config(min_approvals: u32, review_teams: &[&str]) -> AppConfig {
    AppConfig {
        min_approvals,
        review_teams: review_teams.iter().map(ToString::to_string).collect(),
        collaborators_only: false,
        ..AppConfig::default()
    }
}

pub fn settings(toml: &str) -> Settings {
    Settings::from_toml(toml).unwrap()
}

/// Settings with one approval, rebase merges and no collaborator filter
pub fn lenient_settings() -> Settings {
    settings(
        r#"
        [defaults]
        minApprovals = 1
        collaboratorsOnly = false
        "#,
    )
}
