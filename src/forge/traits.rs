//! Traits related to the remote forge
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::request::{
        CommitDetail, Commit, CreateBranchRequest, CreatePrRequest,
        ForgeCommit, ForgePullRequest, ForgeRelease, GetCommitRequest,
        GetFileContentRequest, GetPrRequest, ListCommitsRequest,
        ListPullRequestsRequest, ListReleasesRequest, PullRequest,
        UpdatePrRequest,
    },
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    async fn list_releases(
        &self,
        req: ListReleasesRequest,
    ) -> Result<Vec<ForgeRelease>>;
    async fn list_closed_pull_requests(
        &self,
        req: ListPullRequestsRequest,
    ) -> Result<Vec<ForgePullRequest>>;
    async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<ForgeCommit>>;
    async fn get_commit(&self, req: GetCommitRequest) -> Result<CommitDetail>;
    async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<Option<String>>;
    async fn find_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>>;
    async fn create_branch(&self, req: CreateBranchRequest) -> Result<Commit>;
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;
    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()>;
}
