//! Scripted mock platform service for testing
//!
//! The mock is built from an ordered list of expected calls, each with a canned
//! reply. Every trait call pops the next expectation and asserts its
//! arguments, so a test reads as the exact conversation the policy engine has
//! with GitHub. An unexpected call panics.

#![allow(dead_code)]

use async_trait::async_trait;
use merge_me::error::{Error, Result};
use merge_me::platform::PlatformService;
use merge_me::types::{
    BranchProtection, CheckSuite, CombinedStatus, MergeMethod, MergeResult, PullRequest,
    Repository, Review,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// An outbound call, with repositories flattened to `owner/name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetBranchProtection { repo: String, branch: String },
    GetCombinedStatus { repo: String, sha: String },
    ListCheckSuites { repo: String, sha: String },
    ListReviews { repo: String, number: u64 },
    IsCollaborator { repo: String, login: String },
    ListTeamMembers { org: String, team: String },
    FindOpenPrs { repo: String, head: String },
    GetPr { repo: String, number: u64 },
    MergePr {
        repo: String,
        number: u64,
        sha: String,
        method: MergeMethod,
    },
}

impl Call {
    pub fn protection(repo: &str, branch: &str) -> Self {
        Self::GetBranchProtection {
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    pub fn combined_status(repo: &str, sha: &str) -> Self {
        Self::GetCombinedStatus {
            repo: repo.into(),
            sha: sha.into(),
        }
    }

    pub fn check_suites(repo: &str, sha: &str) -> Self {
        Self::ListCheckSuites {
            repo: repo.into(),
            sha: sha.into(),
        }
    }

    pub fn reviews(repo: &str, number: u64) -> Self {
        Self::ListReviews {
            repo: repo.into(),
            number,
        }
    }

    pub fn collaborator(repo: &str, login: &str) -> Self {
        Self::IsCollaborator {
            repo: repo.into(),
            login: login.into(),
        }
    }

    pub fn team_members(org: &str, team: &str) -> Self {
        Self::ListTeamMembers {
            org: org.into(),
            team: team.into(),
        }
    }

    pub fn open_prs(repo: &str, head: &str) -> Self {
        Self::FindOpenPrs {
            repo: repo.into(),
            head: head.into(),
        }
    }

    pub fn pr(repo: &str, number: u64) -> Self {
        Self::GetPr {
            repo: repo.into(),
            number,
        }
    }

    pub fn merge(repo: &str, number: u64, sha: &str, method: MergeMethod) -> Self {
        Self::MergePr {
            repo: repo.into(),
            number,
            sha: sha.into(),
            method,
        }
    }
}

/// Canned reply for a [`Call`]
#[derive(Debug)]
pub enum Reply {
    Protection(Result<BranchProtection>),
    Status(Result<CombinedStatus>),
    Suites(Result<Vec<CheckSuite>>),
    Reviews(Result<Vec<Review>>),
    Collaborator(Result<bool>),
    Members(Result<Vec<String>>),
    Prs(Result<Vec<PullRequest>>),
    Pr(Result<PullRequest>),
    Merge(Result<MergeResult>),
}

/// Scripted mock platform service
#[derive(Default)]
pub struct MockPlatformService {
    script: Mutex<VecDeque<(Call, Reply)>>,
    calls: Mutex<Vec<Call>>,
}

impl MockPlatformService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expected call and its reply
    #[must_use]
    pub fn expect(self, call: Call, reply: Reply) -> Self {
        self.script.lock().unwrap().push_back((call, reply));
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of expectations not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// Panic unless every scripted call happened
    pub fn assert_done(&self) {
        let script = self.script.lock().unwrap();
        let pending: Vec<&Call> = script.iter().map(|(call, _)| call).collect();
        assert!(pending.is_empty(), "expected calls never made: {pending:?}");
    }

    /// Pop the reply for `call`.
    ///
    /// Team member lookups run concurrently, so within a run of consecutive
    /// `ListTeamMembers` expectations any order is accepted.
    fn next(&self, call: Call) -> Reply {
        self.calls.lock().unwrap().push(call.clone());
        let mut script = self.script.lock().unwrap();

        let index = if matches!(call, Call::ListTeamMembers { .. }) {
            script
                .iter()
                .take_while(|(expected, _)| matches!(expected, Call::ListTeamMembers { .. }))
                .position(|(expected, _)| *expected == call)
                .unwrap_or(0)
        } else {
            0
        };

        let Some((expected, reply)) = script.remove(index) else {
            panic!("unexpected call: {call:?}");
        };
        assert_eq!(expected, call, "call out of script");
        reply
    }
}

fn unexpected_reply(call: &str, reply: &Reply) -> Error {
    panic!("{call}: scripted reply has wrong kind: {reply:?}")
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_branch_protection(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<BranchProtection> {
        match self.next(Call::protection(&repo.full_name(), branch)) {
            Reply::Protection(reply) => reply,
            other => Err(unexpected_reply("get_branch_protection", &other)),
        }
    }

    async fn get_combined_status(&self, repo: &Repository, sha: &str) -> Result<CombinedStatus> {
        match self.next(Call::combined_status(&repo.full_name(), sha)) {
            Reply::Status(reply) => reply,
            other => Err(unexpected_reply("get_combined_status", &other)),
        }
    }

    async fn list_check_suites(&self, repo: &Repository, sha: &str) -> Result<Vec<CheckSuite>> {
        match self.next(Call::check_suites(&repo.full_name(), sha)) {
            Reply::Suites(reply) => reply,
            other => Err(unexpected_reply("list_check_suites", &other)),
        }
    }

    async fn list_reviews(&self, repo: &Repository, number: u64) -> Result<Vec<Review>> {
        match self.next(Call::reviews(&repo.full_name(), number)) {
            Reply::Reviews(reply) => reply,
            other => Err(unexpected_reply("list_reviews", &other)),
        }
    }

    async fn is_collaborator(&self, repo: &Repository, login: &str) -> Result<bool> {
        match self.next(Call::collaborator(&repo.full_name(), login)) {
            Reply::Collaborator(reply) => reply,
            other => Err(unexpected_reply("is_collaborator", &other)),
        }
    }

    async fn list_team_members(&self, org: &str, team_slug: &str) -> Result<Vec<String>> {
        match self.next(Call::team_members(org, team_slug)) {
            Reply::Members(reply) => reply,
            other => Err(unexpected_reply("list_team_members", &other)),
        }
    }

    async fn find_open_prs(&self, repo: &Repository, head: &str) -> Result<Vec<PullRequest>> {
        match self.next(Call::open_prs(&repo.full_name(), head)) {
            Reply::Prs(reply) => reply,
            other => Err(unexpected_reply("find_open_prs", &other)),
        }
    }

    async fn get_pr(&self, repo: &Repository, number: u64) -> Result<PullRequest> {
        match self.next(Call::pr(&repo.full_name(), number)) {
            Reply::Pr(reply) => reply,
            other => Err(unexpected_reply("get_pr", &other)),
        }
    }

    async fn merge_pr(
        &self,
        repo: &Repository,
        number: u64,
        sha: &str,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        match self.next(Call::merge(&repo.full_name(), number, sha, method)) {
            Reply::Merge(reply) => reply,
            other => Err(unexpected_reply("merge_pr", &other)),
        }
    }
}
