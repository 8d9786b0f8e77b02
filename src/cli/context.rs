//! Shared command context for CLI commands
//!
//! Loads settings, resolves credentials and builds the GitHub service.

use merge_me::auth::get_github_auth;
use merge_me::config::Settings;
use merge_me::error::{Error, Result};
use merge_me::platform::{GitHubService, PlatformService};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Shared context for CLI commands that talk to GitHub
pub struct CommandContext {
    /// Loaded settings
    pub settings: Settings,
    /// Platform service
    pub platform: Arc<dyn PlatformService>,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// `config` overrides the default settings path; a missing file yields
    /// built-in defaults.
    pub fn new(config: Option<&Path>, token: Option<&str>, api_url: Option<&str>) -> Result<Self> {
        let settings = match config.map(Path::to_path_buf).or_else(Settings::default_path) {
            Some(path) => {
                debug!(path = %path.display(), "loading settings");
                Settings::load(&path)?
            }
            None => Settings::default(),
        };

        let auth = get_github_auth(token)?;
        debug!(source = ?auth.source, "resolved GitHub token");

        let platform = GitHubService::new(&auth.token, api_url)
            .map_err(|e| Error::Platform(format!("failed to create GitHub client: {e}")))?;

        Ok(Self {
            settings,
            platform: Arc::new(platform),
        })
    }
}
