//! Walks the spec repository history and proposes one entry per day of
//! spec changes.
use chrono::{DateTime, Days, NaiveDate, Utc};
use log::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::{
    Result,
    config::{OpenApiConfig, RepoRef},
    entry::{
        ProposedFile,
        filename::FilenameAllocator,
        template::{EntryTemplateVars, render_template},
    },
    forge::{
        request::{GetCommitRequest, GetFileContentRequest, ListCommitsRequest},
        traits::Forge,
    },
    openapi::{
        diff::{DiffChange, SpecDiffer},
        summary::{AnalyzedChanges, GENERIC_SUMMARY, analyze_openapi_changes},
    },
};

/// Maximum pages of commit history listed per watched path.
pub const MAX_COMMIT_PAGES: u32 = 5;

const SHORT_SHA_LEN: usize = 7;

/// A commit that touched at least one watched spec path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenApiCommit {
    pub sha: String,
    pub short_sha: String,
    /// First line of the commit message
    pub message: String,
    pub committed_at: DateTime<Utc>,
    pub url: String,
    /// Watched paths changed by the commit, sorted
    pub paths: Vec<String>,
    /// Diff summary against the parent, when a diff was available
    pub changes: Option<AnalyzedChanges>,
}

impl OpenApiCommit {
    /// UTC calendar day of the commit.
    pub fn day(&self) -> NaiveDate {
        self.committed_at.date_naive()
    }
}

/// Builds the entry for one day of spec changes.
pub trait EntryBuilder {
    fn build_entry(
        &mut self,
        day: NaiveDate,
        commits: &[OpenApiCommit],
    ) -> Result<ProposedFile>;
}

impl<F> EntryBuilder for F
where
    F: FnMut(NaiveDate, &[OpenApiCommit]) -> Result<ProposedFile>,
{
    fn build_entry(
        &mut self,
        day: NaiveDate,
        commits: &[OpenApiCommit],
    ) -> Result<ProposedFile> {
        self(day, commits)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub days: usize,
    pub commits: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenApiIngestResult {
    pub files: Vec<ProposedFile>,
    /// Newest commit observed, or the cached SHA when nothing new was seen
    pub latest_sha: Option<String>,
    pub report: IngestReport,
}

/// Start of the commit window: the later of the lookback start and the day
/// after the newest local entry.
pub fn since_for(
    today: NaiveDate,
    lookback_days: u32,
    latest_local: Option<NaiveDate>,
) -> DateTime<Utc> {
    let lookback = today
        .checked_sub_days(Days::new(lookback_days.into()))
        .unwrap_or(today);

    let start = latest_local
        .and_then(|d| d.checked_add_days(Days::new(1)))
        .map_or(lookback, |next| next.max(lookback));

    start.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().trim().to_string()
}

/// Collect commits touching any watched path, merged by SHA and newest
/// first. Listing of a path stops at `cached_sha`.
async fn collect_commits(
    forge: &dyn Forge,
    config: &OpenApiConfig,
    since: DateTime<Utc>,
    cached_sha: Option<&str>,
    report: &mut IngestReport,
) -> Vec<OpenApiCommit> {
    let mut commits: Vec<OpenApiCommit> = vec![];
    let mut index: HashMap<String, usize> = HashMap::new();

    for path in config.paths.iter() {
        let listed = match forge
            .list_commits(ListCommitsRequest {
                repo: config.repo.clone(),
                path: path.clone(),
                since: Some(since),
                max_pages: MAX_COMMIT_PAGES,
            })
            .await
        {
            Ok(listed) => listed,
            Err(err) => {
                warn!("failed to list commits for {path}: {err}");
                report.errors.push(format!("{}:{path}: {err}", config.repo));
                continue;
            }
        };

        debug!("{} commits touch {path} since {since}", listed.len());

        for commit in listed {
            if cached_sha == Some(commit.sha.as_str()) {
                debug!("reached cached sha {} for {path}", commit.sha);
                break;
            }

            if let Some(idx) = index.get(&commit.sha) {
                let existing = &mut commits[*idx];
                if !existing.paths.contains(path) {
                    existing.paths.push(path.clone());
                    existing.paths.sort();
                }
                continue;
            }

            index.insert(commit.sha.clone(), commits.len());
            commits.push(OpenApiCommit {
                short_sha: commit.sha.chars().take(SHORT_SHA_LEN).collect(),
                message: first_line(&commit.message),
                committed_at: commit.committed_at,
                url: commit.url,
                paths: vec![path.clone()],
                sha: commit.sha,
                changes: None,
            });
        }
    }

    commits.sort_by(|a, b| b.committed_at.cmp(&a.committed_at));
    commits
}

/// Diff every watched path of `commit` against its first parent. Returns
/// `None` when no path produced a diff.
async fn diff_commit(
    forge: &dyn Forge,
    repo: &RepoRef,
    differ: &dyn SpecDiffer,
    commit: &OpenApiCommit,
    report: &mut IngestReport,
) -> Option<AnalyzedChanges> {
    let detail = match forge
        .get_commit(GetCommitRequest {
            repo: repo.clone(),
            sha: commit.sha.clone(),
        })
        .await
    {
        Ok(detail) => detail,
        Err(err) => {
            warn!("failed to fetch commit {}: {err}", commit.short_sha);
            report.errors.push(format!("{repo}@{}: {err}", commit.short_sha));
            return None;
        }
    };

    let parent = detail.parents.first()?;
    let mut changes: Vec<DiffChange> = vec![];
    let mut diffed = false;

    for path in commit.paths.iter() {
        let fetch = |reference: &str| {
            forge.get_file_content(GetFileContentRequest {
                repo: repo.clone(),
                path: path.clone(),
                reference: Some(reference.to_string()),
            })
        };

        let (base, head) = match (fetch(parent).await, fetch(&commit.sha).await) {
            (Ok(Some(base)), Ok(Some(head))) => (base, head),
            (Err(err), _) | (_, Err(err)) => {
                warn!("failed to fetch {path} for {}: {err}", commit.short_sha);
                report.errors.push(format!("{repo}@{}:{path}: {err}", commit.short_sha));
                continue;
            }
            _ => {
                debug!("{path} missing on one side of {}", commit.short_sha);
                continue;
            }
        };

        match differ.diff(&base, &head) {
            Ok(diff) => {
                diffed = true;
                changes.extend(diff.changes);
            }
            Err(err) => debug!("no diff for {path} at {}: {err}", commit.short_sha),
        }
    }

    diffed.then(|| analyze_openapi_changes(&changes))
}

/// Propose entries for spec changes newer than `latest_local`.
///
/// Commits are grouped by UTC committer day and days at or before the
/// newest local entry are dropped, so each remaining day yields exactly one
/// file from `builder`. Listing and content fetch failures are recorded in
/// the report and the run continues.
pub async fn ingest_openapi_commits(
    forge: &dyn Forge,
    config: &OpenApiConfig,
    latest_local: Option<NaiveDate>,
    cached_sha: Option<&str>,
    differ: Option<&dyn SpecDiffer>,
    builder: &mut dyn EntryBuilder,
) -> Result<OpenApiIngestResult> {
    if !config.enabled {
        return Ok(OpenApiIngestResult::default());
    }

    let mut report = IngestReport::default();
    let since = since_for(Utc::now().date_naive(), config.lookback_days, latest_local);

    info!("scanning {} for spec changes since {since}", config.repo);

    let mut commits =
        collect_commits(forge, config, since, cached_sha, &mut report).await;

    let latest_sha = commits
        .first()
        .map(|c| c.sha.clone())
        .or_else(|| cached_sha.map(String::from));

    let mut days: BTreeMap<NaiveDate, Vec<OpenApiCommit>> = BTreeMap::new();

    for commit in commits.drain(..) {
        let day = commit.day();
        if latest_local.is_some_and(|latest| day <= latest) {
            debug!("skipping {} from already published day {day}", commit.short_sha);
            continue;
        }
        days.entry(day).or_default().push(commit);
    }

    let mut files = vec![];

    for (day, mut day_commits) in days {
        day_commits.sort_by(|a, b| a.committed_at.cmp(&b.committed_at));

        if let Some(differ) = differ.filter(|_| config.diffing()) {
            for commit in day_commits.iter_mut() {
                let changes =
                    diff_commit(forge, &config.repo, differ, commit, &mut report).await;
                commit.changes = changes;
            }
        }

        let file = builder.build_entry(day, &day_commits)?;
        info!("proposing {} for {} spec commits", file.path, day_commits.len());

        report.days += 1;
        report.commits += day_commits.len();
        files.push(file);
    }

    Ok(OpenApiIngestResult {
        files,
        latest_sha,
        report,
    })
}

/// Default [`EntryBuilder`]: renders the entry template with the day's
/// commits and their diff summaries.
pub struct OpenApiEntryBuilder {
    template: String,
    allocator: FilenameAllocator,
}

impl OpenApiEntryBuilder {
    pub const TITLE: &'static str = "OpenAPI Specification Updates";

    pub fn new(template: String, allocator: FilenameAllocator) -> Self {
        Self {
            template,
            allocator,
        }
    }

    fn summary(commits: &[OpenApiCommit]) -> String {
        let summaries = commits
            .iter()
            .filter_map(|c| c.changes.as_ref())
            .map(|c| c.summary.clone())
            .filter(|s| s != GENERIC_SUMMARY)
            .collect::<Vec<String>>();

        if summaries.is_empty() {
            let noun = if commits.len() == 1 { "change" } else { "changes" };
            return format!("{GENERIC_SUMMARY} ({} {noun}).", commits.len());
        }

        format!("{}.", summaries.join("; "))
    }

    fn details(commits: &[OpenApiCommit]) -> String {
        let mut lines = vec!["## Changes".to_string(), String::new()];

        for commit in commits {
            let link = if commit.url.is_empty() {
                format!("`{}`", commit.short_sha)
            } else {
                format!("[`{}`]({})", commit.short_sha, commit.url)
            };
            lines.push(format!("- {} ({link})", commit.message));

            if let Some(changes) = &commit.changes {
                for detail in changes.details.iter() {
                    lines.push(format!("  - {detail}"));
                }
            }
        }

        lines.join("\n")
    }
}

impl EntryBuilder for OpenApiEntryBuilder {
    fn build_entry(
        &mut self,
        day: NaiveDate,
        commits: &[OpenApiCommit],
    ) -> Result<ProposedFile> {
        let mut categories = vec!["API".to_string()];
        if commits
            .iter()
            .any(|c| c.changes.as_ref().is_some_and(|a| a.breaking))
        {
            categories.push("Breaking".into());
        }

        let content = render_template(
            &self.template,
            &EntryTemplateVars {
                title: Self::TITLE.into(),
                categories,
                summary: Self::summary(commits),
                detailed_content: Self::details(commits),
            },
        );

        let file_name = self.allocator.allocate(day, Self::TITLE);

        Ok(ProposedFile::entry(
            &file_name,
            content,
            format!("docs(changelog): add OpenAPI updates for {day}"),
        ))
    }
}

#[cfg(test)]
mod tests;
