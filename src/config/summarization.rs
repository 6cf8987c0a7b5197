use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default maximum number of bullets kept in a release digest.
pub const DEFAULT_MAX_BULLETS: usize = 3;
/// Default maximum number of characters in a release digest.
pub const DEFAULT_MAX_CHARS: usize = 300;

/// How release notes are condensed into changelog summaries.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Keep the cleaned notes, only cut to `max_chars`.
    Off,
    /// Extract bullets and prose locally.
    #[default]
    Heuristic,
    /// Hosted summarization. Not available in this tool, falls back to
    /// `Heuristic`.
    Llm,
}

/// Release summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct SummarizationConfig {
    pub mode: SummaryMode,
    /// Maximum number of bullet lines kept from the notes
    pub max_bullets: usize,
    /// Maximum length of the digest in characters
    pub max_chars: usize,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            mode: SummaryMode::Heuristic,
            max_bullets: DEFAULT_MAX_BULLETS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl SummarizationConfig {
    /// Apply the `CHANGELOG_SUMMARIZE` override. Truthy values select
    /// `Llm`, anything else selects `Heuristic`.
    pub fn apply_env_override(&mut self, value: Option<&str>) {
        if let Some(value) = value {
            let truthy = matches!(
                value.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
            self.mode = if truthy {
                SummaryMode::Llm
            } else {
                SummaryMode::Heuristic
            };
        }
    }
}
