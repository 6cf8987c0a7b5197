//! Common test utilities for orchestrator tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::{path::Path, rc::Rc};

use crate::{
    config::{Config, SourceRepoConfig},
    entry::ENTRIES_DIR,
    forge::{
        request::{ForgePullRequest, ForgeRelease},
        traits::{Forge, MockForge},
    },
    orchestrator::Orchestrator,
};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        owner: "acme".into(),
        repos: vec![SourceRepoConfig {
            repo: "sdk".into(),
            category: "SDK".into(),
            display_name: Some("Acme SDK".into()),
        }],
        ..Default::default()
    }
}

/// Creates a test Orchestrator rooted at `root` with the provided mock
/// forge.
pub fn create_test_orchestrator(
    mock_forge: MockForge,
    config: Config,
    root: &Path,
) -> Orchestrator {
    Orchestrator::builder()
        .config(Rc::new(config))
        .forge(Rc::new(mock_forge) as Rc<dyn Forge>)
        .repo_root(root)
        .today(today())
        .build()
        .unwrap()
}

pub fn release(tag: &str, published_at: Option<DateTime<Utc>>, notes: &str) -> ForgeRelease {
    ForgeRelease {
        tag: tag.into(),
        name: Some(tag.into()),
        url: format!("https://github.com/acme/sdk/releases/tag/{tag}"),
        notes: notes.into(),
        draft: false,
        prerelease: false,
        published_at,
    }
}

pub fn merged_pr(number: u64, title: &str, merged_at: DateTime<Utc>) -> ForgePullRequest {
    ForgePullRequest {
        number,
        title: title.into(),
        url: format!("https://github.com/acme/sdk/pull/{number}"),
        labels: vec![],
        closed_at: Some(merged_at),
        merged_at: Some(merged_at),
    }
}

/// Write an existing entry so the latest local date is known.
pub fn write_entry(root: &Path, file_name: &str) {
    let dir = root.join(ENTRIES_DIR);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(file_name),
        "---\ntitle: \"Old\"\ncategories: [\"SDK\"]\n---\n\nOld entry.\n",
    )
    .unwrap();
}
