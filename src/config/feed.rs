use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// RSS channel metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct FeedConfig {
    pub title: String,
    pub description: String,
    /// Public site root, entries link to `<site_url>/changelog#<slug>`
    pub site_url: String,
    pub language: String,
    pub author_name: String,
    pub author_link: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: "Glean Developer Changelog".into(),
            description: "Updates and changes to the Glean Developer Platform"
                .into(),
            site_url: "https://developers.glean.com".into(),
            language: "en".into(),
            author_name: "Glean".into(),
            author_link: "https://glean.com".into(),
        }
    }
}
