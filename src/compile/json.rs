use chrono::{DateTime, NaiveTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    Result,
    compile::{CompileOutcome, DATA_FILE},
    entry::{ChangelogEntry, ENTRIES_DIR, parse_changelog_entry},
};

/// Hash of the entries directory from the last successful compile.
pub const JSON_CACHE_FILE: &str = ".changelog-cache.json";

/// Contents of `src/data/changelog.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogData {
    /// Newest first
    pub entries: Vec<ChangelogEntry>,
    pub categories: Vec<String>,
    /// Date of the newest entry at midnight UTC
    pub generated_at: DateTime<Utc>,
    pub total_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonCache {
    directory_hash: String,
    generated_at: DateTime<Utc>,
}

fn entry_file_names(entries_dir: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(entries_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .filter(|name| name.ends_with(".md"))
        .collect::<Vec<String>>();

    names.sort();
    Ok(names)
}

/// SHA-256 over the sorted entry file names and their contents.
pub fn entries_hash(entries_dir: &Path) -> Result<String> {
    let mut hasher = Sha256::new();

    for name in entry_file_names(entries_dir)? {
        let content = fs::read(entries_dir.join(&name))?;
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(&content);
        hasher.update([0u8]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn load_cache(path: &Path) -> Option<JsonCache> {
    let content = fs::read_to_string(path).ok()?;

    match serde_json::from_str(&content) {
        Ok(cache) => Some(cache),
        Err(err) => {
            warn!("failed to load changelog cache: {err}");
            None
        }
    }
}

fn save_cache(path: &Path, cache: &JsonCache) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(cache)?)?;
    Ok(())
}

/// Parse every entry in `entries_dir`, newest file name first. Entries that
/// fail to parse are logged and left out.
pub fn load_entries(entries_dir: &Path) -> Result<Vec<ChangelogEntry>> {
    let mut entries = vec![];

    for name in entry_file_names(entries_dir)?.into_iter().rev() {
        let content = fs::read_to_string(entries_dir.join(&name))?;

        match parse_changelog_entry(&name, &content) {
            Ok(entry) => entries.push(entry),
            Err(err) => error!("error parsing changelog entry {name}: {err}"),
        }
    }

    Ok(entries)
}

impl ChangelogData {
    pub fn from_entries(entries: Vec<ChangelogEntry>) -> Self {
        let categories = entries
            .iter()
            .flat_map(|e| e.categories.iter().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        let newest = entries
            .first()
            .map(|e| e.date)
            .unwrap_or_else(|| Utc::now().date_naive());

        Self {
            total_entries: entries.len(),
            generated_at: newest.and_time(NaiveTime::MIN).and_utc(),
            categories,
            entries,
        }
    }
}

/// Paths used by [`compile_json`].
#[derive(Debug, Clone)]
pub struct JsonPaths {
    pub entries_dir: PathBuf,
    pub output: PathBuf,
    pub cache: PathBuf,
}

impl JsonPaths {
    pub fn for_repo(repo_root: &Path) -> Self {
        Self {
            entries_dir: repo_root.join(ENTRIES_DIR),
            output: repo_root.join(DATA_FILE),
            cache: repo_root.join(JSON_CACHE_FILE),
        }
    }
}

/// Compile all entries into the site data file, skipping the work when the
/// entries directory hash matches the cache and the output exists.
pub fn compile_json(paths: &JsonPaths) -> Result<CompileOutcome> {
    if !paths.entries_dir.is_dir() {
        error!(
            "changelog entries directory does not exist: {}",
            paths.entries_dir.display()
        );
        return Ok(CompileOutcome::NoEntries);
    }

    let hash = entries_hash(&paths.entries_dir)?;

    if paths.output.exists()
        && load_cache(&paths.cache).is_some_and(|c| c.directory_hash == hash)
    {
        info!("no changes detected in changelog entries, skipping generation");
        return Ok(CompileOutcome::Unchanged);
    }

    if entry_file_names(&paths.entries_dir)?.is_empty() {
        info!("no changelog entries found");
        return Ok(CompileOutcome::NoEntries);
    }

    let data = ChangelogData::from_entries(load_entries(&paths.entries_dir)?);

    if let Some(parent) = paths.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&paths.output, serde_json::to_string_pretty(&data)?)?;

    let cache = JsonCache {
        directory_hash: hash,
        generated_at: Utc::now(),
    };
    if let Err(err) = save_cache(&paths.cache, &cache) {
        warn!("failed to save changelog cache: {err}");
    }

    info!("generated changelog data with {} entries", data.total_entries);

    Ok(CompileOutcome::Generated {
        path: paths.output.clone(),
        entries: data.total_entries,
    })
}
