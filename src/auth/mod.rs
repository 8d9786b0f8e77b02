//! Authentication for GitHub
//!
//! Supports an explicit token, environment variables and the `gh` CLI.

use crate::error::{Error, Result};
use std::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token passed on the command line
    Flag,
    /// Token from environment variable
    EnvVar,
    /// Token from the `gh` CLI
    Cli,
}

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

/// Resolve a GitHub token from the process environment or `gh auth token`
pub fn get_github_auth(explicit: Option<&str>) -> Result<GitHubAuthConfig> {
    resolve_github_auth(explicit, |name| std::env::var(name).ok(), gh_cli_token)
}

/// Resolve a GitHub token using the given lookups.
///
/// Order: explicit token, `GITHUB_TOKEN`, `GH_TOKEN`, `gh` CLI. Blank values
/// are skipped.
pub fn resolve_github_auth(
    explicit: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    cli: impl FnOnce() -> Option<String>,
) -> Result<GitHubAuthConfig> {
    let usable = |token: String| {
        let token = token.trim().to_string();
        (!token.is_empty()).then_some(token)
    };

    if let Some(token) = explicit.map(str::to_string).and_then(usable) {
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Flag,
        });
    }

    for name in TOKEN_ENV_VARS {
        if let Some(token) = env(name).and_then(usable) {
            debug!(var = name, "using token from environment");
            return Ok(GitHubAuthConfig {
                token,
                source: AuthSource::EnvVar,
            });
        }
    }

    if let Some(token) = cli().and_then(usable) {
        debug!("using token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    Err(Error::Auth(
        "no GitHub token found; set GITHUB_TOKEN or run 'gh auth login'".to_string(),
    ))
}

fn gh_cli_token() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}
