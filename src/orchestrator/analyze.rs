//! Side-effect free analysis: classify upstream releases and pull requests
//! and propose changelog entries for them.
use chrono::{DateTime, NaiveDate, Utc};
use log::*;
use regex::Regex;
use semver::Version;
use std::{collections::HashSet, sync::LazyLock};

use crate::{
    Result,
    config::{PullRequestConfig, RepoRef, SourceRepoConfig},
    entry::{
        ENTRIES_DIR, ProposedFile, filename::FilenameAllocator,
        get_latest_changelog_entry_date,
        template::{EntryTemplateVars, TemplateLocator, render_template},
    },
    forge::{
        config::SYNC_BRANCH_PREFIX,
        request::{ForgePullRequest, ForgeRelease, ListPullRequestsRequest, ListReleasesRequest},
    },
    openapi::{OpenApiChangesRunner, OpenApiEntryBuilder, SpecDiffer, ingest_openapi_commits},
    orchestrator::{
        Orchestrator,
        cache::read_openapi_cache,
        pr_body::{pr_title, render_pr_body},
        types::{
            AnalyzeOutput, ItemKind, OpenApiState, PrProposal, ReleaseInfo,
            Report, ReportItem,
        },
    },
    summarizer::summarize_release,
};

/// Pages of releases listed per source repository.
pub const MAX_RELEASE_PAGES: u32 = 3;

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)")
        .unwrap()
});

static CONVENTIONAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<type>[a-zA-Z]+)(\([^)]*\))?!?:").unwrap());

/// Semantic version embedded in a release tag such as `v1.2.3` or
/// `pkg@1.2.3`.
pub fn normalize_version(tag: &str) -> Option<Version> {
    VERSION_REGEX
        .captures(tag)
        .and_then(|caps| Version::parse(&caps[1]).ok())
}

/// Whether a pull request title uses one of the non user-facing
/// conventional commit types.
pub fn is_non_user_facing(title: &str, skip_prefixes: &[String]) -> bool {
    let Some(caps) = CONVENTIONAL_REGEX.captures(title.trim()) else {
        return false;
    };

    let kind = caps["type"].to_lowercase();
    skip_prefixes.iter().any(|p| p.eq_ignore_ascii_case(&kind))
}

fn is_new(latest: Option<NaiveDate>, at: DateTime<Utc>) -> bool {
    latest.is_none_or(|latest| at.date_naive() > latest)
}

/// Reason a merged pull request is left out of the changelog.
pub fn pr_skip_reason(
    pr: &ForgePullRequest,
    config: &PullRequestConfig,
) -> Option<String> {
    if pr.merged_at.is_none() {
        return Some("not merged".into());
    }

    if let Some(label) = pr
        .labels
        .iter()
        .find(|l| config.exclude_labels.iter().any(|e| e.eq_ignore_ascii_case(l)))
    {
        return Some(format!("excluded label: {label}"));
    }

    if is_non_user_facing(&pr.title, &config.skip_prefixes) {
        return Some("no user-facing change".into());
    }

    None
}

#[derive(Debug)]
struct ReleaseCandidate {
    info: ReleaseInfo,
    notes: String,
    pull_requests: Vec<ForgePullRequest>,
}

impl ReleaseCandidate {
    fn summary_source(&self) -> String {
        if !self.notes.trim().is_empty() {
            return self.notes.clone();
        }

        self.pull_requests
            .iter()
            .map(|pr| format!("- {}", pr.title))
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn details(&self) -> String {
        let mut lines = vec![];

        if !self.pull_requests.is_empty() {
            lines.push("## What's changed".to_string());
            lines.push(String::new());
            for pr in self.pull_requests.iter() {
                if pr.url.is_empty() {
                    lines.push(format!("- {} (#{})", pr.title, pr.number));
                } else {
                    lines.push(format!("- {} ([#{}]({}))", pr.title, pr.number, pr.url));
                }
            }
            lines.push(String::new());
        }

        if !self.info.url.is_empty() {
            lines.push(format!("[Full release notes]({})", self.info.url));
        }

        lines.join("\n")
    }

    fn is_breaking(&self) -> bool {
        let notes = self.notes.to_lowercase();
        notes.contains("breaking change")
            || self.pull_requests.iter().any(|pr| {
                CONVENTIONAL_REGEX
                    .find(&pr.title)
                    .is_some_and(|m| m.as_str().ends_with("!:"))
            })
    }
}

/// Keep releases that are published after `latest`, reporting drafts,
/// prereleases and repeated versions as skipped. Returned oldest first.
fn classify_releases(
    repo: &RepoRef,
    releases: Vec<ForgeRelease>,
    latest: Option<NaiveDate>,
    report: &mut Report,
) -> Vec<ReleaseCandidate> {
    let mut candidates = vec![];
    let mut seen: HashSet<Version> = HashSet::new();

    for release in releases {
        let item =
            ReportItem::new(ItemKind::Release, repo, &release.tag).with_url(&release.url);

        if release.draft {
            report.skip(item, "draft release");
            continue;
        }

        let Some(published_at) = release.published_at else {
            report.skip(item, "not published");
            continue;
        };

        if !is_new(latest, published_at) {
            debug!("{repo} {} is already in the changelog", release.tag);
            continue;
        }

        if release.prerelease {
            report.skip(item, "prerelease");
            continue;
        }

        let normalized_version = normalize_version(&release.tag);

        if let Some(version) = &normalized_version {
            if !seen.insert(version.clone()) {
                report.skip(item, format!("duplicate of version {version}"));
                continue;
            }
        }

        candidates.push(ReleaseCandidate {
            info: ReleaseInfo {
                tag: release.tag,
                url: release.url,
                published_at,
                normalized_version,
            },
            notes: release.notes,
            pull_requests: vec![],
        });
    }

    candidates.sort_by(|a, b| a.info.published_at.cmp(&b.info.published_at));
    candidates
}

/// Attach each merged pull request to the first release published after
/// it was merged.
fn assign_pull_requests(
    repo: &RepoRef,
    prs: Vec<ForgePullRequest>,
    candidates: &mut [ReleaseCandidate],
    latest: Option<NaiveDate>,
    config: &PullRequestConfig,
    report: &mut Report,
) {
    for pr in prs {
        let item = ReportItem::new(ItemKind::PullRequest, repo, format!("#{}", pr.number))
            .with_url(&pr.url);

        let Some(activity) = pr.merged_at.or(pr.closed_at) else {
            continue;
        };

        if !is_new(latest, activity) {
            continue;
        }

        if let Some(reason) = pr_skip_reason(&pr, config) {
            report.skip(item, reason);
            continue;
        }

        match candidates
            .iter_mut()
            .find(|c| c.info.published_at >= activity)
        {
            Some(candidate) => {
                debug!("#{} ships in {} {}", pr.number, repo, candidate.info.tag);
                candidate.pull_requests.push(pr);
                report.include(item);
            }
            None => report.skip(item, "not yet released"),
        }
    }
}

impl Orchestrator {
    /// Compute the changelog entries and pull request a sync would
    /// produce. Performs no writes.
    pub async fn analyze(&self) -> Result<AnalyzeOutput> {
        self.config.require_repos()?;

        let entries_dir = self.repo_root.join(ENTRIES_DIR);
        let latest = get_latest_changelog_entry_date(&entries_dir)?;
        let template = TemplateLocator::for_repo(&self.repo_root).load()?;

        match latest {
            Some(date) => info!("latest changelog entry: {date}"),
            None => info!("no changelog entries found: considering all history"),
        }

        let mut allocator = FilenameAllocator::new(&entries_dir);
        let mut report = Report::default();
        let mut files = vec![];

        for source in self.config.repos.iter() {
            let mut repo_files = self
                .analyze_repo(source, latest, &template, &mut allocator, &mut report)
                .await?;
            files.append(&mut repo_files);
        }

        let cached_sha = read_openapi_cache(&self.repo_root).await;
        let mut openapi = OpenApiState {
            latest_processed_sha: cached_sha.clone(),
        };

        if let Some(openapi_config) = self.config.openapi_config() {
            let located = match (&self.differ, openapi_config.diffing()) {
                (None, true) => {
                    OpenApiChangesRunner::locate(openapi_config.diff_bin.as_deref())
                }
                _ => None,
            };

            if openapi_config.diffing() && self.differ.is_none() && located.is_none() {
                warn!("openapi-changes not found: spec entries will not include diffs");
            }

            let differ: Option<&dyn SpecDiffer> = match (&self.differ, &located) {
                (Some(differ), _) => Some(differ.as_ref()),
                (None, Some(runner)) => Some(runner),
                (None, None) => None,
            };

            let mut builder = OpenApiEntryBuilder::new(template.clone(), allocator);

            let result = ingest_openapi_commits(
                self.forge.as_ref(),
                &openapi_config,
                latest,
                cached_sha.as_deref(),
                differ,
                &mut builder,
            )
            .await?;

            for file in result.files.iter() {
                report.include(ReportItem::new(
                    ItemKind::Openapi,
                    &openapi_config.repo,
                    file.file_name(),
                ));
            }

            for err in result.report.errors {
                report.error(
                    ReportItem::new(ItemKind::Openapi, &openapi_config.repo, "commits"),
                    err,
                );
            }

            files.extend(result.files);
            openapi.latest_processed_sha = result.latest_sha;
        }

        files.sort_by(|a: &ProposedFile, b: &ProposedFile| a.path.cmp(&b.path));
        report.finish();

        info!(
            "analysis complete: {} files, {} included, {} skipped, {} errors",
            files.len(),
            report.stats.included_count,
            report.stats.skipped_count,
            report.stats.error_count
        );

        let body = render_pr_body(self.today, &files, &report)?;

        Ok(AnalyzeOutput {
            latest_changelog_entry_date: latest,
            pr: PrProposal {
                target_repo: self.config.target_repo(),
                base_branch: self.config.base_branch.clone(),
                branch_name: format!("{SYNC_BRANCH_PREFIX}{}", self.today),
                title: pr_title(self.today),
                body,
            },
            files,
            openapi,
            report,
        })
    }

    async fn analyze_repo(
        &self,
        source: &SourceRepoConfig,
        latest: Option<NaiveDate>,
        template: &str,
        allocator: &mut FilenameAllocator,
        report: &mut Report,
    ) -> Result<Vec<ProposedFile>> {
        let repo = self.config.source_repo(source);

        info!("analyzing {repo}");

        let releases = match self
            .forge
            .list_releases(ListReleasesRequest {
                repo: repo.clone(),
                max_pages: MAX_RELEASE_PAGES,
            })
            .await
        {
            Ok(releases) => releases,
            Err(err) => {
                warn!("failed to list releases for {repo}: {err}");
                report.error(
                    ReportItem::new(ItemKind::Release, &repo, "releases"),
                    format!("fetch failed: {err}"),
                );
                return Ok(vec![]);
            }
        };

        let mut candidates = classify_releases(&repo, releases, latest, report);

        match self
            .forge
            .list_closed_pull_requests(ListPullRequestsRequest {
                repo: repo.clone(),
                base_branch: self.config.base_branch.clone(),
                max_pages: self.config.pull_requests.max_pages,
            })
            .await
        {
            Ok(prs) => assign_pull_requests(
                &repo,
                prs,
                &mut candidates,
                latest,
                &self.config.pull_requests,
                report,
            ),
            Err(err) => {
                warn!("failed to list pull requests for {repo}: {err}");
                report.error(
                    ReportItem::new(ItemKind::PullRequest, &repo, "pulls"),
                    format!("fetch failed: {err}"),
                );
            }
        }

        let mut files = vec![];

        for candidate in candidates {
            let item = ReportItem::new(ItemKind::Release, &repo, &candidate.info.tag)
                .with_url(&candidate.info.url);

            let source_text = candidate.summary_source();
            if source_text.trim().is_empty() {
                report.skip(item, "no user-facing change");
                continue;
            }

            let title = format!("{} {}", source.display_name(), candidate.info.tag);
            let mut categories = vec![source.category.clone()];
            if candidate.is_breaking() {
                categories.push("Breaking".into());
            }

            let content = render_template(
                template,
                &EntryTemplateVars {
                    title: title.clone(),
                    categories,
                    summary: summarize_release(&source_text, &self.config.summarization),
                    detailed_content: candidate.details(),
                },
            );

            let file_name =
                allocator.allocate(candidate.info.published_at.date_naive(), &title);

            debug!("proposing {file_name} for {repo} {}", candidate.info.tag);

            files.push(ProposedFile::entry(
                &file_name,
                content,
                format!("docs(changelog): add {title}"),
            ));
            report.include(item);
        }

        Ok(files)
    }
}
