use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RepoRef;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to list published releases of a repository.
pub struct ListReleasesRequest {
    pub repo: RepoRef,
    pub max_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Release as returned by the forge.
pub struct ForgeRelease {
    pub tag: String,
    pub name: Option<String>,
    pub url: String,
    pub notes: String,
    pub draft: bool,
    pub prerelease: bool,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to list closed pull requests against a base branch, newest
/// first.
pub struct ListPullRequestsRequest {
    pub repo: RepoRef,
    pub base_branch: String,
    pub max_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Closed pull request. `merged_at` is empty when it was closed unmerged.
pub struct ForgePullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub labels: Vec<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to list commits touching `path`, newest first.
pub struct ListCommitsRequest {
    pub repo: RepoRef,
    pub path: String,
    pub since: Option<DateTime<Utc>>,
    pub max_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Commit summary from a commit listing.
pub struct ForgeCommit {
    pub sha: String,
    pub message: String,
    pub committed_at: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for the details of a single commit.
pub struct GetCommitRequest {
    pub repo: RepoRef,
    pub sha: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Parents and changed paths of a commit.
pub struct CommitDetail {
    pub sha: String,
    pub parents: Vec<String>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for a file at a ref, default branch when `reference` is empty.
pub struct GetFileContentRequest {
    pub repo: RepoRef,
    pub path: String,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to find an open pull request whose head branch starts with
/// `head_prefix`.
pub struct GetPrRequest {
    pub repo: RepoRef,
    pub base_branch: String,
    pub head_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Pull request opened or found by this tool.
pub struct PullRequest {
    pub number: u64,
    pub head_branch: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A file committed on its own with its own message.
pub struct FileChange {
    /// Relative path to the file starting from repo root
    pub path: String,
    pub content: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to point `branch` at a chain of commits, one per file, on top
/// of `base_branch`.
pub struct CreateBranchRequest {
    pub repo: RepoRef,
    pub branch: String,
    pub base_branch: String,
    pub file_changes: Vec<FileChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to open a new pull request.
pub struct CreatePrRequest {
    pub repo: RepoRef,
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to update an existing pull request.
pub struct UpdatePrRequest {
    pub repo: RepoRef,
    pub pr_number: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub sha: String,
}
