use serde::{Deserialize, Serialize};

use crate::entry::ENTRIES_DIR;

/// A new entry file and the message of the commit that adds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedFile {
    /// Path relative to the repository root
    pub path: String,
    pub content: String,
    pub commit_message: String,
}

impl ProposedFile {
    /// File below the entries directory.
    pub fn entry(file_name: &str, content: String, commit_message: String) -> Self {
        Self {
            path: format!("{ENTRIES_DIR}/{file_name}"),
            content,
            commit_message,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}
