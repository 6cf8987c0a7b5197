//! Implements the Forge trait for Github
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use log::*;
use octocrab::{
    Octocrab,
    models::repos::Object,
    params::{self, repos::Reference},
};

use crate::{
    ChangelogError, Result,
    config::RepoRef,
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig},
        request::{
            Commit, CommitDetail, CreateBranchRequest, CreatePrRequest,
            ForgeCommit, ForgePullRequest, ForgeRelease, GetCommitRequest,
            GetFileContentRequest, GetPrRequest, ListCommitsRequest,
            ListPullRequestsRequest, ListReleasesRequest, PullRequest,
            UpdatePrRequest,
        },
        traits::Forge,
    },
};

mod types;

use types::{
    CommitDetailResponse, CommitListItem, CommitsQuery, GithubTree,
    GithubTreeEntry, TREE_BLOB_MODE, TREE_BLOB_TYPE, Tree,
};

/// GitHub forge implementation using Octocrab for API interactions with
/// releases, pull requests, commits and file contents.
pub struct Github {
    base_uri: String,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_base_uri();
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?
            .build()?;

        Ok(Self { base_uri, instance })
    }

    fn repo_endpoint(&self, repo: &RepoRef, path: &str) -> String {
        format!("{}/repos/{}/{}/{path}", self.base_uri, repo.owner, repo.repo)
    }

    async fn branch_sha(&self, repo: &RepoRef, branch: &str) -> Result<String> {
        let reference = self
            .instance
            .repos(&repo.owner, &repo.repo)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await?;

        match reference.object {
            Object::Commit { sha, .. } => Ok(sha),
            _ => Err(ChangelogError::forge(format!(
                "failed to find sha of branch {branch} in {repo}"
            ))),
        }
    }

    async fn create_tree(&self, repo: &RepoRef, tree: GithubTree) -> Result<Tree> {
        let endpoint = self.repo_endpoint(repo, "git/trees");
        let body = serde_json::json!(tree);

        debug!("creating tree starting from: {}", tree.base_tree);

        let tree: Tree = self.instance.post(endpoint, Some(&body)).await?;

        debug!("created new tree: {}", tree.sha);

        Ok(tree)
    }

    async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        parent_sha: &str,
        tree_sha: &str,
    ) -> Result<Commit> {
        let endpoint = self.repo_endpoint(repo, "git/commits");

        let body = serde_json::json!({
          "message": message,
          "tree": tree_sha,
          "parents": [parent_sha],
        });

        let commit: Commit = self.instance.post(endpoint, Some(&body)).await?;

        Ok(commit)
    }

    async fn point_branch(
        &self,
        repo: &RepoRef,
        branch: &str,
        sha: &str,
    ) -> Result<()> {
        let existing = self
            .instance
            .repos(&repo.owner, &repo.repo)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await;

        if existing.is_ok() {
            info!("branch {branch} already exists: updating");
            let endpoint =
                self.repo_endpoint(repo, &format!("git/refs/heads/{branch}"));
            let _: serde_json::Value = self
                .instance
                .patch(
                    endpoint,
                    Some(&serde_json::json!({ "sha": sha, "force": true })),
                )
                .await?;
            return Ok(());
        }

        info!("creating branch {branch}");

        self.instance
            .repos(&repo.owner, &repo.repo)
            .create_ref(&Reference::Branch(branch.to_string()), sha)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Forge for Github {
    async fn list_releases(
        &self,
        req: ListReleasesRequest,
    ) -> Result<Vec<ForgeRelease>> {
        let mut releases = vec![];

        for page in 1..=req.max_pages.max(1) {
            let result = self
                .instance
                .repos(&req.repo.owner, &req.repo.repo)
                .releases()
                .list()
                .per_page(DEFAULT_PAGE_SIZE)
                .page(page)
                .send()
                .await?;

            let done = result.next.is_none();

            releases.extend(result.items.into_iter().map(|r| ForgeRelease {
                tag: r.tag_name,
                name: r.name,
                url: r.html_url.to_string(),
                notes: r.body.unwrap_or_default(),
                draft: r.draft,
                prerelease: r.prerelease,
                published_at: r.published_at,
            }));

            if done {
                break;
            }
        }

        debug!("found {} releases for {}", releases.len(), req.repo);

        Ok(releases)
    }

    async fn list_closed_pull_requests(
        &self,
        req: ListPullRequestsRequest,
    ) -> Result<Vec<ForgePullRequest>> {
        let mut prs = vec![];

        for page in 1..=req.max_pages.max(1) {
            let result = self
                .instance
                .pulls(&req.repo.owner, &req.repo.repo)
                .list()
                .state(params::State::Closed)
                .base(req.base_branch.clone())
                .sort(params::pulls::Sort::Updated)
                .direction(params::Direction::Descending)
                .per_page(DEFAULT_PAGE_SIZE)
                .page(page)
                .send()
                .await?;

            let done = result.next.is_none();

            prs.extend(result.items.into_iter().map(|pr| ForgePullRequest {
                number: pr.number,
                title: pr.title.unwrap_or_default(),
                url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
                labels: pr
                    .labels
                    .unwrap_or_default()
                    .into_iter()
                    .map(|l| l.name)
                    .collect(),
                closed_at: pr.closed_at,
                merged_at: pr.merged_at,
            }));

            if done {
                break;
            }
        }

        debug!("found {} closed pull requests for {}", prs.len(), req.repo);

        Ok(prs)
    }

    async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<ForgeCommit>> {
        let endpoint = self.repo_endpoint(&req.repo, "commits");
        let mut commits = vec![];

        for page in 1..=req.max_pages.max(1) {
            let query = CommitsQuery {
                path: req.path.clone(),
                since: req.since.map(|s| s.to_rfc3339()),
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };

            let items: Vec<CommitListItem> =
                self.instance.get(&endpoint, Some(&query)).await?;

            let count = items.len();

            for item in items {
                let Some(committed_at) = item.date() else {
                    warn!("skipping commit {} without a date", item.sha);
                    continue;
                };

                commits.push(ForgeCommit {
                    message: item.commit.message.clone(),
                    sha: item.sha,
                    committed_at,
                    url: item.html_url,
                });
            }

            if count < DEFAULT_PAGE_SIZE as usize {
                break;
            }
        }

        Ok(commits)
    }

    async fn get_commit(&self, req: GetCommitRequest) -> Result<CommitDetail> {
        let endpoint = self.repo_endpoint(&req.repo, &format!("commits/{}", req.sha));

        let detail: CommitDetailResponse =
            self.instance.get(endpoint, None::<&()>).await?;

        Ok(CommitDetail {
            sha: detail.sha,
            parents: detail.parents.into_iter().map(|p| p.sha).collect(),
            files: detail.files.into_iter().map(|f| f.filename).collect(),
        })
    }

    async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<Option<String>> {
        let repos = self.instance.repos(&req.repo.owner, &req.repo.repo);
        let mut builder = repos.get_content().path(&req.path);

        if let Some(reference) = &req.reference {
            builder = builder.r#ref(reference);
        }

        let result = builder.send().await;

        match result {
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code.as_u16() == 404 =>
            {
                debug!("no file found for path: {}", req.path);
                Ok(None)
            }
            Err(err) => {
                error!("error getting contents for path {}: {err}", req.path);
                Err(err.into())
            }
            Ok(mut data) => {
                let items = data.take_items();

                let Some(encoded) = items.first().and_then(|i| i.content.clone())
                else {
                    debug!("no file content for path: {}", req.path);
                    return Ok(None);
                };

                let cleaned = encoded.replace(['\n', '\r'], "");
                let bytes = STANDARD.decode(cleaned)?;

                Ok(Some(String::from_utf8(bytes)?))
            }
        }
    }

    async fn find_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>> {
        let prs = self
            .instance
            .pulls(&req.repo.owner, &req.repo.repo)
            .list()
            .state(params::State::Open)
            .base(req.base_branch.clone())
            .per_page(DEFAULT_PAGE_SIZE)
            .send()
            .await?;

        let found = prs
            .items
            .into_iter()
            .find(|pr| pr.head.ref_field.starts_with(&req.head_prefix))
            .map(|pr| PullRequest {
                number: pr.number,
                head_branch: pr.head.ref_field.clone(),
                url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
            });

        if let Some(pr) = &found {
            info!("found open changelog pr #{} on {}", pr.number, pr.head_branch);
        }

        Ok(found)
    }

    async fn create_branch(&self, req: CreateBranchRequest) -> Result<Commit> {
        let mut parent = self.branch_sha(&req.repo, &req.base_branch).await?;
        let mut last = Commit {
            sha: parent.clone(),
        };

        for change in req.file_changes {
            let path = change
                .path
                .strip_prefix("./")
                .unwrap_or(&change.path)
                .to_string();

            let tree = self
                .create_tree(
                    &req.repo,
                    GithubTree {
                        base_tree: parent.clone(),
                        tree: vec![GithubTreeEntry {
                            path,
                            mode: TREE_BLOB_MODE.into(),
                            kind: TREE_BLOB_TYPE.into(),
                            content: change.content,
                        }],
                    },
                )
                .await?;

            last = self
                .create_commit(&req.repo, &change.message, &parent, &tree.sha)
                .await?;

            debug!("created commit {} for {}", last.sha, change.path);
            parent = last.sha.clone();
        }

        self.point_branch(&req.repo, &req.branch, &last.sha).await?;

        Ok(last)
    }

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        let pr = self
            .instance
            .pulls(&req.repo.owner, &req.repo.repo)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .send()
            .await?;

        Ok(PullRequest {
            number: pr.number,
            head_branch: pr.head.ref_field.clone(),
            url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
        })
    }

    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()> {
        self.instance
            .pulls(&req.repo.owner, &req.repo.repo)
            .update(req.pr_number)
            .title(req.title)
            .body(req.body)
            .send()
            .await?;

        Ok(())
    }
}
