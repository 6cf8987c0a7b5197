use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GithubTreeEntry {
    pub path: String,
    pub mode: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct GithubTree {
    pub base_tree: String,
    pub tree: Vec<GithubTreeEntry>,
}

#[derive(Debug, Deserialize)]
pub struct Tree {
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct CommitsQuery {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    pub per_page: u8,
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct CommitSignature {
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CommitData {
    pub message: String,
    pub committer: Option<CommitSignature>,
    pub author: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
pub struct CommitListItem {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: CommitData,
}

impl CommitListItem {
    /// Committer date, author date when the committer carries none.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.commit
            .committer
            .as_ref()
            .and_then(|c| c.date)
            .or_else(|| self.commit.author.as_ref().and_then(|a| a.date))
    }
}

#[derive(Debug, Deserialize)]
pub struct ParentRef {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetailResponse {
    pub sha: String,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}

pub const TREE_BLOB_MODE: &str = "100644";
pub const TREE_BLOB_TYPE: &str = "blob";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_list_item_prefers_committer_date() {
        let item: CommitListItem = serde_json::from_value(serde_json::json!({
            "sha": "abc",
            "html_url": "https://github.com/acme/open-api/commit/abc",
            "commit": {
                "message": "Update spec\n\nbody",
                "author": { "date": "2025-01-01T10:00:00Z" },
                "committer": { "date": "2025-01-02T01:00:00Z" }
            }
        }))
        .unwrap();

        assert_eq!(item.date().unwrap().to_rfc3339(), "2025-01-02T01:00:00+00:00");
    }

    #[test]
    fn commit_detail_tolerates_missing_files() {
        let detail: CommitDetailResponse = serde_json::from_value(
            serde_json::json!({ "sha": "abc", "parents": [{ "sha": "def" }] }),
        )
        .unwrap();

        assert_eq!(detail.parents[0].sha, "def");
        assert!(detail.files.is_empty());
    }
}
