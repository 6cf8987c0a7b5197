use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{config::RepoRef, entry::ProposedFile};

/// Kind of upstream item considered during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Release,
    #[serde(rename = "pr")]
    PullRequest,
    Openapi,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Release => write!(f, "release"),
            ItemKind::PullRequest => write!(f, "pr"),
            ItemKind::Openapi => write!(f, "openapi"),
        }
    }
}

/// One classified upstream item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    pub kind: ItemKind,
    pub repo: String,
    /// Tag, pull request number or commit path
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReportItem {
    pub fn new(kind: ItemKind, repo: &RepoRef, id: impl Into<String>) -> Self {
        Self {
            kind,
            repo: repo.to_string(),
            id: id.into(),
            url: None,
            reason: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.is_empty() {
            self.url = Some(url);
        }
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_processed: usize,
    pub included_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
}

/// Included, skipped and errored items of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub stats: ReportStats,
    #[serde(default)]
    pub included: Vec<ReportItem>,
    #[serde(default)]
    pub skipped: Vec<ReportItem>,
    #[serde(default)]
    pub errors: Vec<ReportItem>,
}

impl Report {
    pub fn include(&mut self, item: ReportItem) {
        self.included.push(item);
    }

    pub fn skip(&mut self, item: ReportItem, reason: impl Into<String>) {
        self.skipped.push(item.with_reason(reason));
    }

    pub fn error(&mut self, item: ReportItem, reason: impl Into<String>) {
        self.errors.push(item.with_reason(reason));
    }

    /// Recompute the counters from the item lists.
    pub fn finish(&mut self) {
        self.stats = ReportStats {
            total_processed: self.included.len()
                + self.skipped.len()
                + self.errors.len(),
            included_count: self.included.len(),
            skipped_count: self.skipped.len(),
            error_count: self.errors.len(),
        };
    }
}

/// Pull request proposed by an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrProposal {
    pub target_repo: RepoRef,
    pub base_branch: String,
    pub branch_name: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiState {
    pub latest_processed_sha: Option<String>,
}

/// Side-effect free result of one analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput {
    pub latest_changelog_entry_date: Option<NaiveDate>,
    pub pr: PrProposal,
    pub files: Vec<ProposedFile>,
    #[serde(default)]
    pub openapi: OpenApiState,
    #[serde(default)]
    pub report: Report,
}

/// Projection of an upstream release used for ordering and de-duplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub tag: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub normalized_version: Option<semver::Version>,
}

/// Where `apply` takes its analysis from.
#[derive(Debug, Clone)]
pub enum ApplyInput {
    Output(Box<AnalyzeOutput>),
    File(std::path::PathBuf),
}

/// Result of a successful `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The analysis proposed no files
    NothingToApply,
    Applied {
        pr_number: u64,
        pr_url: String,
        branch: String,
        files: usize,
        /// An existing changelog pull request was amended
        updated: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_every_list() {
        let repo = RepoRef::new("acme", "sdk");
        let mut report = Report::default();

        report.include(ReportItem::new(ItemKind::Release, &repo, "v1.0.0"));
        report.skip(ReportItem::new(ItemKind::PullRequest, &repo, "12"), "not merged");
        report.error(ReportItem::new(ItemKind::Release, &repo, "releases"), "boom");
        report.finish();

        assert_eq!(
            report.stats,
            ReportStats {
                total_processed: 3,
                included_count: 1,
                skipped_count: 1,
                error_count: 1,
            }
        );
        assert_eq!(report.skipped[0].reason.as_deref(), Some("not merged"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let output = AnalyzeOutput {
            latest_changelog_entry_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            pr: PrProposal {
                target_repo: RepoRef::new("acme", "site"),
                base_branch: "main".into(),
                branch_name: "changelog/sync-2025-01-02".into(),
                title: "title".into(),
                body: "body".into(),
            },
            files: vec![],
            openapi: OpenApiState {
                latest_processed_sha: Some("abc".into()),
            },
            report: Report::default(),
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["latestChangelogEntryDate"], "2025-01-01");
        assert_eq!(json["pr"]["targetRepo"]["repo"], "site");
        assert_eq!(json["pr"]["branchName"], "changelog/sync-2025-01-02");
        assert_eq!(json["openapi"]["latestProcessedSha"], "abc");
        assert_eq!(json["report"]["stats"]["totalProcessed"], 0);

        let back: AnalyzeOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, output);
    }

    #[test]
    fn item_kind_names() {
        assert_eq!(
            serde_json::to_value(ItemKind::PullRequest).unwrap(),
            "pr"
        );
        assert_eq!(ItemKind::Openapi.to_string(), "openapi");
    }
}
