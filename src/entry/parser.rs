use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::{
    ChangelogError, Result,
    entry::markdown::{ProcessedContent, process_changelog_content},
};

static FILENAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<date>\d{4}-\d{2}-\d{2})-(?<slug>.+)\.md$").unwrap()
});

static FRONT_MATTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?<data>.*?)\r?\n---[ \t]*(?:\r?\n|\z)(?<body>.*)\z")
        .unwrap()
});

/// One published changelog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    /// `<date>-<slug>`
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Taken from the file name, never from front-matter
    pub date: NaiveDate,
    pub categories: Vec<String>,
    pub summary: String,
    pub full_content: String,
    pub has_truncation: bool,
    pub file_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    categories: Option<Vec<String>>,
}

/// Split raw file text into parsed front-matter and body.
fn split_front_matter(
    file_name: &str,
    raw: &str,
) -> Result<(FrontMatter, String)> {
    let Some(captures) = FRONT_MATTER_REGEX.captures(raw) else {
        return Ok((FrontMatter::default(), raw.to_string()));
    };

    let data = &captures["data"];
    let body = captures["body"].to_string();

    if data.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }

    let front_matter: FrontMatter =
        serde_yaml::from_str(data).map_err(|e| {
            ChangelogError::InvalidFrontMatter {
                file: file_name.to_string(),
                reason: e.to_string(),
            }
        })?;

    Ok((front_matter, body))
}

/// Extract the date and slug encoded in an entry file name.
pub fn parse_entry_filename(file_name: &str) -> Result<(NaiveDate, String)> {
    let captures = FILENAME_REGEX
        .captures(file_name)
        .ok_or_else(|| ChangelogError::InvalidFilename(file_name.into()))?;

    let date_str = &captures["date"];
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| ChangelogError::InvalidDate(date_str.into()))?;

    Ok((date, captures["slug"].to_string()))
}

/// Parse an entry file into a [`ChangelogEntry`]. Parsing is all or nothing.
pub fn parse_changelog_entry(
    file_name: &str,
    raw_content: &str,
) -> Result<ChangelogEntry> {
    let (date, slug) = parse_entry_filename(file_name)?;
    let (front_matter, body) = split_front_matter(file_name, raw_content)?;

    let title = front_matter.title.ok_or_else(|| {
        ChangelogError::InvalidFrontMatter {
            file: file_name.to_string(),
            reason: "missing title".into(),
        }
    })?;

    let mut categories: Vec<String> = vec![];
    for category in front_matter.categories.unwrap_or_default() {
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    let ProcessedContent {
        summary,
        full_content,
        has_truncation,
    } = process_changelog_content(body.trim());

    Ok(ChangelogEntry {
        id: format!("{}-{slug}", date.format("%Y-%m-%d")),
        slug,
        title,
        date,
        categories,
        summary,
        full_content,
        has_truncation,
        file_name: file_name.to_string(),
    })
}
