use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::RepoRef;

/// Default repository holding the OpenAPI specifications.
pub const DEFAULT_OPENAPI_REPO: &str = "open-api";
/// Default number of days of spec history scanned on each run.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// External engine used to diff two specification revisions.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum DiffEngine {
    #[default]
    OpenapiChanges,
    None,
}

/// Repository coordinates as written in the config file. The owner falls
/// back to the top level `owner`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct OpenApiRepoConfig {
    pub owner: Option<String>,
    pub repo: String,
}

impl Default for OpenApiRepoConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: DEFAULT_OPENAPI_REPO.into(),
        }
    }
}

/// OpenAPI specification ingestion settings.
#[derive(
    Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default,
)]
#[serde(default)]
pub struct OpenApiSection {
    pub enabled: bool,
    pub repo: OpenApiRepoConfig,
    /// Spec file paths watched for changes
    pub paths: Vec<String>,
    pub lookback_days: Option<u32>,
    /// Run the diff engine between each commit and its parent
    pub diff_enabled: Option<bool>,
    /// Location of the diff binary, defaults to a `PATH` lookup
    pub diff_bin: Option<String>,
    pub diff_engine: Option<DiffEngine>,
}

/// Resolved OpenAPI settings handed to the ingestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiConfig {
    pub enabled: bool,
    pub repo: RepoRef,
    pub paths: Vec<String>,
    pub lookback_days: u32,
    pub diff_enabled: bool,
    pub diff_bin: Option<String>,
    pub diff_engine: DiffEngine,
}

impl OpenApiConfig {
    /// Whether the diff engine should run for each qualifying commit.
    pub fn diffing(&self) -> bool {
        self.diff_enabled && self.diff_engine != DiffEngine::None
    }
}

impl OpenApiSection {
    /// Resolve against the top level owner. Returns `None` when the section
    /// is disabled or watches no paths.
    pub fn resolve(&self, default_owner: &str) -> Option<OpenApiConfig> {
        if !self.enabled || self.paths.is_empty() {
            return None;
        }

        let diff_engine = self.diff_engine.unwrap_or_default();

        Some(OpenApiConfig {
            enabled: true,
            repo: RepoRef::new(
                self.repo.owner.as_deref().unwrap_or(default_owner),
                &self.repo.repo,
            ),
            paths: self.paths.clone(),
            lookback_days: self.lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS),
            diff_enabled: self
                .diff_enabled
                .unwrap_or(diff_engine != DiffEngine::None),
            diff_bin: self.diff_bin.clone(),
            diff_engine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_or_empty_section_resolves_to_none() {
        let section = OpenApiSection::default();
        assert!(section.resolve("acme").is_none());

        let section = OpenApiSection {
            enabled: true,
            ..Default::default()
        };
        assert!(section.resolve("acme").is_none());
    }

    #[test]
    fn resolves_owner_and_defaults() {
        let section = OpenApiSection {
            enabled: true,
            paths: vec!["specs/rest.yaml".into()],
            ..Default::default()
        };

        let resolved = section.resolve("acme").unwrap();
        assert_eq!(resolved.repo, RepoRef::new("acme", "open-api"));
        assert_eq!(resolved.lookback_days, DEFAULT_LOOKBACK_DAYS);
        assert!(resolved.diffing());
    }

    #[test]
    fn engine_none_disables_diffing() {
        let section = OpenApiSection {
            enabled: true,
            paths: vec!["specs/rest.yaml".into()],
            diff_enabled: Some(true),
            diff_engine: Some(DiffEngine::None),
            ..Default::default()
        };

        assert!(!section.resolve("acme").unwrap().diffing());
    }
}
