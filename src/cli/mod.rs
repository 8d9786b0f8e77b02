//! Command-line interface

mod check;
mod context;
mod event;
pub mod style;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use check::{CheckOptions, run_check};
pub use context::CommandContext;
pub use event::run_event;

/// Merge GitHub pull requests once they pass review and status policy
#[derive(Debug, Parser)]
#[command(name = "merge-me", version)]
pub struct Cli {
    /// Settings file (defaults to <config dir>/merge-me/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GitHub token (falls back to GITHUB_TOKEN, GH_TOKEN, then `gh auth token`)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise
    #[arg(long, global = true, value_name = "URL", env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a pull request and merge it if eligible
    Check {
        /// Repository as owner/name
        repo: String,
        /// Pull request number
        number: u64,
        /// Show the verdict without merging
        #[arg(long)]
        dry_run: bool,
        /// Show the verdict and ask before merging
        #[arg(long, conflicts_with = "dry_run")]
        confirm: bool,
    },
    /// Dispatch a webhook payload as if GitHub had delivered it
    Event {
        /// Event name (X-GitHub-Event), e.g. pull_request
        name: String,
        /// Payload file; reads stdin when omitted or `-`
        payload: Option<PathBuf>,
    },
}

/// Run the parsed command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::new(
        cli.config.as_deref(),
        cli.token.as_deref(),
        cli.api_url.as_deref(),
    )?;

    match cli.command {
        Command::Check {
            repo,
            number,
            dry_run,
            confirm,
        } => run_check(&ctx, &repo, number, CheckOptions { dry_run, confirm }).await?,
        Command::Event { name, payload } => run_event(ctx, &name, payload.as_deref()).await?,
    }

    Ok(())
}
