use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default number of closed pull request pages scanned per repository.
pub const DEFAULT_MAX_PR_PAGES: u32 = 5;

/// Rules for classifying merged pull requests.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct PullRequestConfig {
    /// Pull requests carrying any of these labels are skipped
    pub exclude_labels: Vec<String>,
    /// Conventional commit types that carry no user-facing change
    pub skip_prefixes: Vec<String>,
    pub max_pages: u32,
}

impl Default for PullRequestConfig {
    fn default() -> Self {
        Self {
            exclude_labels: vec!["skip-changelog".into(), "no-changelog".into()],
            skip_prefixes: ["chore", "ci", "test", "build", "docs", "refactor", "style"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_pages: DEFAULT_MAX_PR_PAGES,
        }
    }
}
