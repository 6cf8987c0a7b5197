//! Turns an analysis into entry files and a single changelog pull request.
use log::*;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{
    ChangelogError, Result,
    entry::ProposedFile,
    forge::{
        config::SYNC_BRANCH_PREFIX,
        request::{
            CreateBranchRequest, CreatePrRequest, FileChange, GetPrRequest,
            UpdatePrRequest,
        },
    },
    orchestrator::{
        Orchestrator,
        cache::write_openapi_cache,
        types::{AnalyzeOutput, ApplyInput, ApplyOutcome},
    },
};

/// Directory receiving proposed files on a dry run.
pub const PREVIEW_DIR: &str = ".changelog-preview";
/// Analysis hand-off file written by `sync-all` and read by `publish`.
pub const HANDOFF_FILE: &str = ".changelog-generator-output.json";

/// Load a serialized analysis.
pub async fn read_analysis(path: &Path) -> Result<AnalyzeOutput> {
    if !path.exists() {
        return Err(ChangelogError::MissingInputFile(
            path.display().to_string(),
        ));
    }

    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

pub async fn write_analysis(path: &Path, output: &AnalyzeOutput) -> Result<()> {
    let content = serde_json::to_string_pretty(output)?;
    fs::write(path, content).await?;
    debug!("wrote analysis to {}", path.display());
    Ok(())
}

async fn write_file(root: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let target = root.join(relative);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(&target, content).await?;

    Ok(target)
}

/// Write proposed files flat into the preview directory, replacing the
/// previous preview.
pub async fn write_preview(
    repo_root: &Path,
    files: &[ProposedFile],
) -> Result<PathBuf> {
    let preview = repo_root.join(PREVIEW_DIR);

    if preview.exists() {
        fs::remove_dir_all(&preview).await?;
    }
    fs::create_dir_all(&preview).await?;

    for file in files {
        write_file(&preview, file.file_name(), &file.content).await?;
    }

    info!("wrote {} preview files to {}", files.len(), preview.display());

    Ok(preview)
}

impl Orchestrator {
    /// Write the proposed files and open or amend the changelog pull
    /// request. Errors are returned as-is: files written before a failure
    /// stay on disk.
    pub async fn apply(&self, input: ApplyInput) -> Result<ApplyOutcome> {
        let output = match input {
            ApplyInput::Output(output) => *output,
            ApplyInput::File(path) => read_analysis(&path).await?,
        };

        if output.files.is_empty() {
            info!("no changelog entries to apply");
            if let Some(sha) = &output.openapi.latest_processed_sha {
                write_openapi_cache(&self.repo_root, sha).await?;
            }
            return Ok(ApplyOutcome::NothingToApply);
        }

        for file in output.files.iter() {
            let written = write_file(&self.repo_root, &file.path, &file.content).await?;
            info!("wrote {}", written.display());
        }

        let pr = &output.pr;

        let existing = self
            .forge
            .find_open_pr(GetPrRequest {
                repo: pr.target_repo.clone(),
                base_branch: pr.base_branch.clone(),
                head_prefix: SYNC_BRANCH_PREFIX.into(),
            })
            .await?;

        let branch = existing
            .as_ref()
            .map(|p| p.head_branch.clone())
            .unwrap_or_else(|| pr.branch_name.clone());

        let commit = self
            .forge
            .create_branch(CreateBranchRequest {
                repo: pr.target_repo.clone(),
                branch: branch.clone(),
                base_branch: pr.base_branch.clone(),
                file_changes: output
                    .files
                    .iter()
                    .map(|f| FileChange {
                        path: f.path.clone(),
                        content: f.content.clone(),
                        message: f.commit_message.clone(),
                    })
                    .collect(),
            })
            .await?;

        info!("pushed {} to {branch}", commit.sha);

        let (pr_number, pr_url, updated) = match existing {
            Some(open) => {
                info!("updating changelog pr #{}", open.number);
                self.forge
                    .update_pr(UpdatePrRequest {
                        repo: pr.target_repo.clone(),
                        pr_number: open.number,
                        title: pr.title.clone(),
                        body: pr.body.clone(),
                    })
                    .await?;
                (open.number, open.url, true)
            }
            None => {
                let created = self
                    .forge
                    .create_pr(CreatePrRequest {
                        repo: pr.target_repo.clone(),
                        head_branch: branch.clone(),
                        base_branch: pr.base_branch.clone(),
                        title: pr.title.clone(),
                        body: pr.body.clone(),
                    })
                    .await?;
                info!("opened changelog pr #{}: {}", created.number, created.url);
                (created.number, created.url, false)
            }
        };

        if let Some(sha) = &output.openapi.latest_processed_sha {
            write_openapi_cache(&self.repo_root, sha).await?;
        }

        Ok(ApplyOutcome::Applied {
            pr_number,
            pr_url,
            branch,
            files: output.files.len(),
            updated,
        })
    }
}
