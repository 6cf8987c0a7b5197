use chrono::TimeZone;
use std::{cell::RefCell, rc::Rc};
use tempfile::TempDir;

use super::*;
use crate::{
    ChangelogError,
    config::DiffEngine,
    forge::{
        request::{CommitDetail, ForgeCommit},
        traits::MockForge,
    },
    openapi::diff::{MockSpecDiffer, OpenApiDiff},
};

const SPEC: &str = "specs/client_rest.yaml";
const TEMPLATE: &str = "---\ntitle: \"{{TITLE}}\"\ncategories: [{{CATEGORIES}}]\n---\n\n{{SUMMARY}}\n\n{/* truncate */}\n\n{{DETAILED_CONTENT}}\n";

fn config(paths: &[&str], diff: bool) -> OpenApiConfig {
    OpenApiConfig {
        enabled: true,
        repo: RepoRef::new("acme", "open-api"),
        paths: paths.iter().map(|p| p.to_string()).collect(),
        lookback_days: 30,
        diff_enabled: diff,
        diff_bin: None,
        diff_engine: if diff {
            DiffEngine::OpenapiChanges
        } else {
            DiffEngine::None
        },
    }
}

fn commit(sha: &str, message: &str, y: i32, m: u32, d: u32, h: u32) -> ForgeCommit {
    ForgeCommit {
        sha: sha.into(),
        message: message.into(),
        committed_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
        url: format!("https://github.com/acme/open-api/commit/{sha}"),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

type Calls = Rc<RefCell<Vec<(NaiveDate, Vec<String>)>>>;

fn recording_builder(calls: Calls) -> impl FnMut(NaiveDate, &[OpenApiCommit]) -> Result<ProposedFile> {
    move |day: NaiveDate, commits: &[OpenApiCommit]| -> Result<ProposedFile> {
        calls
            .borrow_mut()
            .push((day, commits.iter().map(|c| c.sha.clone()).collect()));
        Ok(ProposedFile::entry(
            &format!("{day}-openapi.md"),
            String::new(),
            format!("openapi {day}"),
        ))
    }
}

#[tokio::test]
async fn disabled_config_returns_nothing() {
    let forge = MockForge::new();
    let mut cfg = config(&[SPEC], false);
    cfg.enabled = false;
    let calls: Calls = Rc::default();
    let mut builder = recording_builder(calls.clone());

    let result = ingest_openapi_commits(&forge, &cfg, None, Some("abc"), None, &mut builder)
        .await
        .unwrap();

    assert_eq!(result, OpenApiIngestResult::default());
    assert!(calls.borrow().is_empty());
}

#[test_log::test(tokio::test)]
async fn same_day_commits_produce_one_entry() {
    let mut forge = MockForge::new();
    forge.expect_list_commits().times(1).returning(|req| {
        assert_eq!(req.path, SPEC);
        assert_eq!(req.repo, RepoRef::new("acme", "open-api"));
        Ok(vec![
            commit("bbbbbbbbbb", "Add widgets endpoint", 2025, 3, 10, 18),
            commit("aaaaaaaaaa", "Fix typo\n\nlong body", 2025, 3, 10, 9),
        ])
    });

    let dir = TempDir::new().unwrap();
    let mut builder = OpenApiEntryBuilder::new(
        TEMPLATE.into(),
        FilenameAllocator::new(dir.path()),
    );

    let result = ingest_openapi_commits(
        &forge,
        &config(&[SPEC], false),
        None,
        None,
        None,
        &mut builder,
    )
    .await
    .unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.report.days, 1);
    assert_eq!(result.report.commits, 2);
    assert_eq!(result.latest_sha.as_deref(), Some("bbbbbbbbbb"));

    let file = &result.files[0];
    assert_eq!(
        file.path,
        "changelog/entries/2025-03-10-openapi-specification-updates.md"
    );
    assert!(file.content.contains("`aaaaaaa`"));
    assert!(file.content.contains("`bbbbbbb`"));
    assert!(file.content.contains("Fix typo"));
    assert!(!file.content.contains("long body"));
    assert!(file.content.contains("OpenAPI specification updated (2 changes)."));

    let fix = file.content.find("Fix typo").unwrap();
    let add = file.content.find("Add widgets endpoint").unwrap();
    assert!(fix < add, "commits are listed oldest first");
}

#[tokio::test]
async fn days_at_or_before_latest_local_are_skipped() {
    let mut forge = MockForge::new();
    forge.expect_list_commits().returning(|_| {
        Ok(vec![
            commit("ccc", "newest", 2025, 3, 12, 1),
            commit("bbb", "same day as latest", 2025, 3, 10, 23),
            commit("aaa", "older", 2025, 3, 9, 8),
        ])
    });

    let calls: Calls = Rc::default();
    let mut builder = recording_builder(calls.clone());

    let result = ingest_openapi_commits(
        &forge,
        &config(&[SPEC], false),
        Some(date(2025, 3, 10)),
        None,
        None,
        &mut builder,
    )
    .await
    .unwrap();

    assert_eq!(*calls.borrow(), vec![(date(2025, 3, 12), vec!["ccc".to_string()])]);
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.latest_sha.as_deref(), Some("ccc"));
}

#[tokio::test]
async fn high_water_mark_advances_without_entries() {
    let mut forge = MockForge::new();
    forge
        .expect_list_commits()
        .returning(|_| Ok(vec![commit("ddd", "old day", 2025, 3, 1, 12)]));

    let calls: Calls = Rc::default();
    let mut builder = recording_builder(calls.clone());

    let result = ingest_openapi_commits(
        &forge,
        &config(&[SPEC], false),
        Some(date(2025, 3, 5)),
        Some("older-sha"),
        None,
        &mut builder,
    )
    .await
    .unwrap();

    assert!(result.files.is_empty());
    assert_eq!(result.latest_sha.as_deref(), Some("ddd"));
}

#[tokio::test]
async fn listing_stops_at_cached_sha() {
    let mut forge = MockForge::new();
    forge.expect_list_commits().returning(|_| {
        Ok(vec![
            commit("new", "new change", 2025, 4, 2, 12),
            commit("cached", "processed", 2025, 4, 1, 12),
            commit("ancient", "processed long ago", 2025, 3, 31, 12),
        ])
    });

    let calls: Calls = Rc::default();
    let mut builder = recording_builder(calls.clone());

    let result = ingest_openapi_commits(
        &forge,
        &config(&[SPEC], false),
        None,
        Some("cached"),
        None,
        &mut builder,
    )
    .await
    .unwrap();

    assert_eq!(*calls.borrow(), vec![(date(2025, 4, 2), vec!["new".to_string()])]);
    assert_eq!(result.latest_sha.as_deref(), Some("new"));
}

#[tokio::test]
async fn cached_sha_kept_when_nothing_new() {
    let mut forge = MockForge::new();
    forge
        .expect_list_commits()
        .returning(|_| Ok(vec![commit("cached", "processed", 2025, 4, 1, 12)]));

    let mut builder = recording_builder(Rc::default());

    let result = ingest_openapi_commits(
        &forge,
        &config(&[SPEC], false),
        None,
        Some("cached"),
        None,
        &mut builder,
    )
    .await
    .unwrap();

    assert!(result.files.is_empty());
    assert_eq!(result.latest_sha.as_deref(), Some("cached"));
}

#[tokio::test]
async fn commits_touching_several_paths_are_merged() {
    let mut forge = MockForge::new();
    forge.expect_list_commits().times(2).returning(|req| {
        let mut listed = vec![commit("shared", "update both", 2025, 5, 1, 10)];
        if req.path == "b.yaml" {
            listed.push(commit("only-b", "update b", 2025, 5, 1, 8));
        }
        Ok(listed)
    });

    let seen: Rc<RefCell<Vec<OpenApiCommit>>> = Rc::default();
    let captured = seen.clone();
    let mut builder = move |day: NaiveDate, commits: &[OpenApiCommit]| -> Result<ProposedFile> {
        captured.borrow_mut().extend(commits.iter().cloned());
        Ok(ProposedFile::entry(&format!("{day}-x.md"), String::new(), String::new()))
    };

    let result = ingest_openapi_commits(
        &forge,
        &config(&["b.yaml", "a.yaml"], false),
        None,
        None,
        None,
        &mut builder,
    )
    .await
    .unwrap();

    assert_eq!(result.report.commits, 2);
    let seen = seen.borrow();
    let shared = seen.iter().find(|c| c.sha == "shared").unwrap();
    assert_eq!(shared.paths, vec!["a.yaml", "b.yaml"]);
}

#[test_log::test(tokio::test)]
async fn list_failures_are_reported_and_skipped() {
    let mut forge = MockForge::new();
    forge.expect_list_commits().returning(|req| {
        if req.path == "broken.yaml" {
            Err(ChangelogError::fetch("boom"))
        } else {
            Ok(vec![commit("ok", "fine", 2025, 6, 1, 10)])
        }
    });

    let mut builder = recording_builder(Rc::default());

    let result = ingest_openapi_commits(
        &forge,
        &config(&["broken.yaml", SPEC], false),
        None,
        None,
        None,
        &mut builder,
    )
    .await
    .unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.report.errors.len(), 1);
    assert!(result.report.errors[0].contains("broken.yaml"));
}

#[tokio::test]
async fn diff_summary_flows_into_entry() {
    let mut forge = MockForge::new();
    forge
        .expect_list_commits()
        .returning(|_| Ok(vec![commit("head1234567", "Add widgets", 2025, 7, 1, 10)]));
    forge.expect_get_commit().times(1).returning(|req| {
        Ok(CommitDetail {
            sha: req.sha,
            parents: vec!["parent".into()],
            files: vec![SPEC.into()],
        })
    });
    forge.expect_get_file_content().times(2).returning(|req| {
        let content = match req.reference.as_deref() {
            Some("parent") => "paths:\n  /v1/widgets: {}\n",
            _ => "paths:\n  /v1/widgets:\n    get: {}\n",
        };
        Ok(Some(content.to_string()))
    });

    let mut differ = MockSpecDiffer::new();
    differ
        .expect_diff()
        .withf(|base, head| base.contains("{}") && head.contains("get"))
        .times(1)
        .returning(|_, _| {
            OpenApiDiff::parse(
                r#"{"changes": [{"property": "path", "changeText": "path added", "breaking": true, "new": "/v1/widgets"}]}"#,
            )
        });

    let dir = TempDir::new().unwrap();
    let mut builder = OpenApiEntryBuilder::new(
        TEMPLATE.into(),
        FilenameAllocator::new(dir.path()),
    );

    let result = ingest_openapi_commits(
        &forge,
        &config(&[SPEC], true),
        None,
        None,
        Some(&differ as &dyn SpecDiffer),
        &mut builder,
    )
    .await
    .unwrap();

    let content = &result.files[0].content;
    assert!(content.contains("⚠️ Breaking: 1 endpoint added."));
    assert!(content.contains("  - Added endpoint: /v1/widgets"));
    assert!(content.contains(r#"categories: ["API", "Breaking"]"#));
}

#[tokio::test]
async fn unavailable_diff_falls_back_to_commit_list() {
    let mut forge = MockForge::new();
    forge
        .expect_list_commits()
        .returning(|_| Ok(vec![commit("head", "Tweak", 2025, 7, 2, 10)]));
    forge.expect_get_commit().returning(|req| {
        Ok(CommitDetail {
            sha: req.sha,
            parents: vec!["parent".into()],
            files: vec![],
        })
    });
    forge
        .expect_get_file_content()
        .returning(|_| Ok(Some("openapi: 3.0.0".into())));

    let mut differ = MockSpecDiffer::new();
    differ
        .expect_diff()
        .returning(|_, _| Err(ChangelogError::diff_unavailable("missing")));

    let dir = TempDir::new().unwrap();
    let mut builder = OpenApiEntryBuilder::new(
        TEMPLATE.into(),
        FilenameAllocator::new(dir.path()),
    );

    let result = ingest_openapi_commits(
        &forge,
        &config(&[SPEC], true),
        None,
        None,
        Some(&differ as &dyn SpecDiffer),
        &mut builder,
    )
    .await
    .unwrap();

    assert!(result.report.errors.is_empty());
    assert!(result.files[0].content.contains("OpenAPI specification updated (1 change)."));
}

#[test]
fn since_is_the_more_restrictive_bound() {
    let today = date(2025, 3, 31);

    assert_eq!(since_for(today, 30, None).date_naive(), date(2025, 3, 1));
    assert_eq!(
        since_for(today, 30, Some(date(2025, 3, 20))).date_naive(),
        date(2025, 3, 21)
    );
    assert_eq!(
        since_for(today, 30, Some(date(2024, 12, 1))).date_naive(),
        date(2025, 3, 1)
    );
    assert_eq!(since_for(today, 0, None).to_rfc3339(), "2025-03-31T00:00:00+00:00");
}
