//! Configuration loading and parsing for `changelog-generator.toml` files.
//!
//! Describes which repositories feed the changelog, where the changelog pull
//! request is opened, how release notes are summarized and which OpenAPI
//! specifications are watched.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{
    env, fmt,
    path::{Path, PathBuf},
};

use crate::{ChangelogError, Result};

pub mod feed;
pub mod openapi;
pub mod pull_requests;
pub mod summarization;

pub use feed::FeedConfig;
pub use openapi::{DiffEngine, OpenApiConfig, OpenApiSection};
pub use pull_requests::PullRequestConfig;
pub use summarization::{SummarizationConfig, SummaryMode};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "changelog-generator.toml";
/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_ENV: &str = "CHANGELOG_CONFIG_PATH";
/// Environment variable forcing the summarization mode.
pub const SUMMARIZE_ENV: &str = "CHANGELOG_SUMMARIZE";

const DEFAULT_OWNER: &str = "gleanwork";
const DEFAULT_BASE_BRANCH: &str = "main";
const DEFAULT_TARGET_REPO: &str = "glean-developer-site";

/// Owner / name pair identifying a GitHub repository.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: &str, repo: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A source repository whose releases and pull requests become entries.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SourceRepoConfig {
    /// Repository name below the configured owner
    pub repo: String,
    /// Primary category applied to entries from this repository
    pub category: String,
    /// Human readable name used in entry titles, defaults to `repo`
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SourceRepoConfig {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.repo)
    }
}

/// Repository receiving the changelog pull request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct TargetConfig {
    pub owner: Option<String>,
    pub repo: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: DEFAULT_TARGET_REPO.into(),
        }
    }
}

/// Root configuration structure for `changelog-generator.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Owner of every source repository
    pub owner: String,
    /// Base branch of the changelog pull request
    pub base_branch: String,
    pub target: TargetConfig,
    pub repos: Vec<SourceRepoConfig>,
    pub summarization: SummarizationConfig,
    pub pull_requests: PullRequestConfig,
    pub openapi: OpenApiSection,
    pub feed: FeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.into(),
            base_branch: DEFAULT_BASE_BRANCH.into(),
            target: TargetConfig::default(),
            repos: vec![],
            summarization: SummarizationConfig::default(),
            pull_requests: PullRequestConfig::default(),
            openapi: OpenApiSection::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.owner = config.owner.trim().to_string();
        config.base_branch = config.base_branch.trim().to_string();

        for (idx, repo) in config.repos.iter().enumerate() {
            if repo.repo.trim().is_empty() {
                return Err(ChangelogError::invalid_config(format!(
                    "repos[{idx}] missing required 'repo' field"
                )));
            }
            if repo.category.trim().is_empty() {
                return Err(ChangelogError::invalid_config(format!(
                    "repos[{idx}] missing required 'category' field"
                )));
            }
        }

        Ok(config)
    }

    /// Load configuration for a repository root, honoring
    /// `CHANGELOG_CONFIG_PATH` and `CHANGELOG_SUMMARIZE`. A missing file
    /// yields the default configuration.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| repo_root.join(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            log::debug!("loading configuration from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        } else if env::var(CONFIG_PATH_ENV).is_ok() {
            return Err(ChangelogError::invalid_config(format!(
                "config not found at {}",
                path.display()
            )));
        } else {
            log::info!("no configuration found: using default");
            Config::default()
        };

        config
            .summarization
            .apply_env_override(env::var(SUMMARIZE_ENV).ok().as_deref());

        Ok(config)
    }

    /// Ensure the configuration can drive a sync run.
    pub fn require_repos(&self) -> Result<()> {
        if self.repos.is_empty() {
            return Err(ChangelogError::invalid_config(
                "repos is empty; add at least one [[repos]] entry",
            ));
        }
        Ok(())
    }

    pub fn target_repo(&self) -> RepoRef {
        RepoRef::new(
            self.target.owner.as_deref().unwrap_or(&self.owner),
            &self.target.repo,
        )
    }

    pub fn source_repo(&self, source: &SourceRepoConfig) -> RepoRef {
        RepoRef::new(&self.owner, &source.repo)
    }

    pub fn openapi_config(&self) -> Option<OpenApiConfig> {
        self.openapi.resolve(&self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.owner, DEFAULT_OWNER);
        assert_eq!(config.base_branch, DEFAULT_BASE_BRANCH);
        assert_eq!(config.summarization.max_bullets, 3);
        assert_eq!(config.summarization.max_chars, 300);
        assert!(config.openapi_config().is_none());
        assert!(config.require_repos().is_err());
    }

    #[test]
    fn parses_full_config() {
        let content = r#"
owner = "acme"
base_branch = "develop"

[target]
repo = "docs-site"

[[repos]]
repo = "api-client-python"
category = "SDK"
display_name = "Python SDK"

[summarization]
mode = "off"
max_bullets = 5

[openapi]
enabled = true
paths = ["final_specs/client_rest.yaml"]
lookback_days = 7
diff_engine = "none"
"#;

        let config = Config::from_toml(content).unwrap();

        assert_eq!(config.target_repo(), RepoRef::new("acme", "docs-site"));
        assert_eq!(config.repos.len(), 1);
        assert_eq!(config.repos[0].display_name(), "Python SDK");
        assert_eq!(
            config.source_repo(&config.repos[0]),
            RepoRef::new("acme", "api-client-python")
        );
        assert_eq!(config.summarization.mode, SummaryMode::Off);
        assert_eq!(config.summarization.max_bullets, 5);
        assert_eq!(config.summarization.max_chars, 300);

        let openapi = config.openapi_config().unwrap();
        assert_eq!(openapi.repo, RepoRef::new("acme", "open-api"));
        assert_eq!(openapi.lookback_days, 7);
        assert!(!openapi.diffing());
    }

    #[test]
    fn rejects_repo_without_category() {
        let content = r#"
[[repos]]
repo = "api-client-go"
category = ""
"#;

        let err = Config::from_toml(content).unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidConfig(_)));
    }
}
