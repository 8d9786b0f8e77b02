//! merge-me: merge GitHub pull requests once they satisfy policy
//!
//! Given a PR, the bot checks its draft/merged flags and merge capability,
//! whether the base branch is protected, its commit statuses and check suites,
//! and its reviews against per-repository settings. Eligible PRs are merged
//! pinned to the evaluated head SHA.
//!
//! Entry points are [`bot::MergeBot`] for webhook events and
//! [`merge::check_merge`] for a single PR.

pub mod auth;
pub mod bot;
pub mod config;
pub mod error;
pub mod events;
pub mod merge;
pub(crate) mod payload;
pub mod platform;
pub mod types;

pub use error::{Error, Result};
