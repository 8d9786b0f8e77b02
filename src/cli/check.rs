//! Check command - evaluate one PR and merge it if eligible

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross, spinner_style};
use anstream::println;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use merge_me::error::{Error, Result};
use merge_me::merge::{Eligibility, check_merge, evaluate_merge, merge};
use merge_me::types::{PullRequest, Repository};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static REPO_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/([A-Za-z0-9._-]+)$"));

/// Options for the check command
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Print the verdict without merging
    pub dry_run: bool,
    /// Print the verdict and prompt before merging
    pub confirm: bool,
}

/// Parse `owner/name` into a repository
pub fn parse_repo(input: &str) -> Result<Repository> {
    let re = REPO_RE
        .as_ref()
        .map_err(|e| Error::Internal(format!("repository pattern: {e}")))?;

    let caps = re
        .captures(input.trim())
        .ok_or_else(|| {
            Error::InvalidInput(format!("invalid repository '{input}', expected owner/name"))
        })?;

    Ok(Repository::new(&caps[1], &caps[2]))
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run the check command
pub async fn run_check(
    ctx: &CommandContext,
    repo: &str,
    number: u64,
    options: CheckOptions,
) -> Result<()> {
    let repo = parse_repo(repo)?;
    let platform = ctx.platform.as_ref();

    let progress = spinner(format!("Fetching {}#{number}...", repo.full_name()));
    let pr = match platform.get_pr(&repo, number).await {
        Ok(pr) => pr,
        Err(e) => {
            progress.finish_and_clear();
            return Err(e);
        }
    };
    progress.finish_with_message(format!("{} Fetched {}", check(), describe(&pr)));

    if !options.dry_run && !options.confirm {
        let progress = spinner(format!("Checking {}...", describe(&pr)));
        let merged = check_merge(platform, &ctx.settings, &pr).await;
        progress.finish_and_clear();

        if merged? {
            println!("{} Merged {}", check(), describe(&pr));
        } else {
            println!("{} {} was not merged", cross(), describe(&pr));
            println!("{}", "Run with --dry-run to see why.".muted());
        }
        return Ok(());
    }

    let config = ctx.settings.resolve(&pr.base_repo)?;

    let progress = spinner(format!("Evaluating {}...", describe(&pr)));
    let verdict = evaluate_merge(platform, &pr, &config).await;
    progress.finish_and_clear();

    let eligibility = match verdict {
        Ok(eligibility) => eligibility,
        Err(e) if e.is_recoverable() => {
            println!("  {} {}", "✗ Would skip:".warn(), e.to_string().muted());
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    report_verdict(&pr, &eligibility);
    if !eligibility.is_eligible() {
        return Ok(());
    }

    if options.dry_run {
        println!("{}", "Run without --dry-run to execute.".muted());
        return Ok(());
    }

    if !Confirm::new()
        .with_prompt(format!("Merge {} using {}?", describe(&pr), config.merge_method))
        .default(true)
        .interact()
        .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
    {
        println!("{}", "Aborted".muted());
        return Ok(());
    }

    let progress = spinner(format!("Merging {}...", describe(&pr)));
    let merged = merge(platform, &pr, config.merge_method).await;
    if merged {
        progress.finish_with_message(format!("{} Merged {}", check(), describe(&pr)));
    } else {
        progress.finish_with_message(format!("{} Merge of {} failed", cross(), describe(&pr)));
    }

    Ok(())
}

fn describe(pr: &PullRequest) -> String {
    format!("{}#{}", pr.base_repo.full_name(), pr.number).accent()
}

/// Report the eligibility verdict
fn report_verdict(pr: &PullRequest, eligibility: &Eligibility) {
    println!("{}:", "Merge check".emphasis());
    println!(
        "  {} {} -> {}",
        "Branch".muted(),
        pr.head_ref.accent(),
        pr.base_ref.accent()
    );
    println!("  {} {}", "Head".muted(), pr.head_sha.muted());

    match eligibility {
        Eligibility::Eligible(_) => {
            println!("  {} {eligibility}", "✓ Would merge:".success());
        }
        Eligibility::Rejected(rejection) => {
            println!("  {} {}", "✗ Would skip:".warn(), rejection.to_string().muted());
        }
    }
}
