//! Error types for merge-me

use crate::config::ConfigError;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while evaluating or merging a pull request
#[derive(Debug, Error)]
pub enum Error {
    /// GitHub returned something we could not make sense of
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Error reported by the octocrab client
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Error reported by the raw HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed configuration for the repository under evaluation
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Policy evaluation could not complete (e.g. team lookup forbidden)
    #[error("merge check failed: {0}")]
    MergeCheck(String),

    /// No usable GitHub credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// Webhook payload could not be decoded
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed user input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Generic platform failure
    #[error("platform error: {0}")]
    Platform(String),

    /// Should not happen
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error only disqualifies the current evaluation.
    ///
    /// Recoverable errors are logged and turn into a "not eligible" verdict.
    /// Everything else aborts the evaluation.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MergeCheck(_))
    }
}
