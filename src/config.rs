//! Settings file loading and per-repository policy configuration
//!
//! The settings file is TOML with a `[defaults]` table and optional
//! `[repos."owner/name"]` overrides:
//!
//! ```toml
//! [defaults]
//! minApprovals = 1
//! mergeMethod = "rebase"
//!
//! [repos."acme/widgets"]
//! minApprovals = 2
//! reviewTeams = ["core", "design"]
//! ```
//!
//! `reviewTeams` entries may name a team requested on the PR by display name
//! or slug. Entries for teams that are not requested must be slugs: they are
//! looked up as `orgs/<owner>/teams/<entry>/members` as written, and a lookup
//! that fails leaves the PR ineligible.
//!
//! Repository tables are validated when an evaluation resolves them, so a
//! broken override only affects that repository.

use crate::types::{MergeMethod, Repository};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Approvals required when nothing is configured
pub const DEFAULT_MIN_APPROVALS: u32 = 1;

/// Directory name under the user config dir
const CONFIG_DIR: &str = "merge-me";

/// Settings filename
const CONFIG_FILE: &str = "config.toml";

/// Configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path of the settings file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Settings file or a repository table is not valid TOML for our schema
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// `minApprovals` is negative or not an integer
    #[error("minApprovals must be a non-negative integer, got {0}")]
    InvalidMinApprovals(String),

    /// `mergeMethod` is not one we support
    #[error("unknown merge method `{0}` (expected `rebase` or `merge`)")]
    UnknownMergeMethod(String),

    /// `reviewTeams` contains an empty entry
    #[error("reviewTeams entries must be non-empty")]
    InvalidReviewTeam,
}

/// Validated policy configuration for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Minimum number of approving reviews
    pub min_approvals: u32,
    /// Teams whose approval is required, in precedence order.
    /// Unrequested teams must be given by slug.
    pub review_teams: Vec<String>,
    /// How to merge
    pub merge_method: MergeMethod,
    /// Only count reviews from repository collaborators
    pub collaborators_only: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_approvals: DEFAULT_MIN_APPROVALS,
            review_teams: Vec::new(),
            merge_method: MergeMethod::default(),
            collaborators_only: true,
        }
    }
}

/// Repository table as written by the user, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRepoConfig {
    min_approvals: Option<toml::Value>,
    review_teams: Option<Vec<String>>,
    merge_method: Option<String>,
    collaborators_only: Option<bool>,
}

impl RawRepoConfig {
    fn validate(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();

        let min_approvals = match self.min_approvals {
            None => defaults.min_approvals,
            Some(toml::Value::Integer(n)) => u32::try_from(n)
                .map_err(|_| ConfigError::InvalidMinApprovals(n.to_string()))?,
            Some(other) => return Err(ConfigError::InvalidMinApprovals(other.to_string())),
        };

        let review_teams = self.review_teams.unwrap_or_default();
        if review_teams.iter().any(|team| team.trim().is_empty()) {
            return Err(ConfigError::InvalidReviewTeam);
        }

        let merge_method = match self.merge_method {
            None => defaults.merge_method,
            Some(method) => method
                .parse()
                .map_err(ConfigError::UnknownMergeMethod)?,
        };

        Ok(AppConfig {
            min_approvals,
            review_teams,
            merge_method,
            collaborators_only: self
                .collaborators_only
                .unwrap_or(defaults.collaborators_only),
        })
    }
}

/// Process-wide settings, resolved per repository on demand
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    defaults: toml::Table,
    #[serde(default)]
    repos: HashMap<String, toml::Table>,
}

impl Settings {
    /// Default settings path (`~/.config/merge-me/config.toml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load settings from disk.
    ///
    /// Returns built-in defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve and validate the configuration for a repository.
    ///
    /// Keys from the repository table override `[defaults]`. Repository keys
    /// are matched case-insensitively, like GitHub does.
    pub fn resolve(&self, repo: &Repository) -> Result<AppConfig, ConfigError> {
        let full_name = repo.full_name();
        let mut merged = self.defaults.clone();

        if let Some((_, overrides)) = self
            .repos
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&full_name))
        {
            merged.extend(overrides.clone());
        }

        let raw: RawRepoConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(format!("{full_name}: {e}")))?;

        raw.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> Repository {
        Repository::new("acme", "widgets")
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.resolve(&repo()).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_repo_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            [defaults]
            minApprovals = 2
            mergeMethod = "merge"

            [repos."Acme/Widgets"]
            minApprovals = 0
            reviewTeams = ["dev", "design"]
            "#,
        )
        .unwrap();

        let config = settings.resolve(&repo()).unwrap();
        assert_eq!(config.min_approvals, 0);
        assert_eq!(config.review_teams, vec!["dev", "design"]);
        assert_eq!(config.merge_method, MergeMethod::Merge);

        let other = settings.resolve(&Repository::new("acme", "gadgets")).unwrap();
        assert_eq!(other.min_approvals, 2);
        assert!(other.review_teams.is_empty());
    }

    #[test]
    fn test_negative_min_approvals_rejected() {
        let settings = Settings::from_toml("[defaults]\nminApprovals = -1\n").unwrap();
        assert!(matches!(
            settings.resolve(&repo()),
            Err(ConfigError::InvalidMinApprovals(v)) if v == "-1"
        ));
    }

    #[test]
    fn test_non_numeric_min_approvals_rejected() {
        let settings = Settings::from_toml("[defaults]\nminApprovals = \"two\"\n").unwrap();
        assert!(matches!(
            settings.resolve(&repo()),
            Err(ConfigError::InvalidMinApprovals(_))
        ));
    }

    #[test]
    fn test_unknown_merge_method_rejected() {
        let settings = Settings::from_toml("[defaults]\nmergeMethod = \"squash\"\n").unwrap();
        assert!(matches!(
            settings.resolve(&repo()),
            Err(ConfigError::UnknownMergeMethod(m)) if m == "squash"
        ));
    }

    #[test]
    fn test_broken_override_only_affects_its_repo() {
        let settings = Settings::from_toml(
            r#"
            [repos."acme/widgets"]
            reviewTeams = "core"
            "#,
        )
        .unwrap();

        assert!(matches!(
            settings.resolve(&repo()),
            Err(ConfigError::Parse(_))
        ));
        assert!(settings.resolve(&Repository::new("acme", "other")).is_ok());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load(&temp.path().join("missing.toml")).unwrap();
        assert_eq!(settings.resolve(&repo()).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[defaults]\ncollaboratorsOnly = false\n").unwrap();

        let config = Settings::load(&path).unwrap().resolve(&repo()).unwrap();
        assert!(!config.collaborators_only);
    }
}
