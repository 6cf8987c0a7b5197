//! Non-interactive creation of a new entry file.
use log::*;
use std::path::{Path, PathBuf};

use crate::{
    ChangelogError, Result,
    entry::{
        ENTRIES_DIR,
        categories::{PRIMARY_CATEGORIES, SECONDARY_CATEGORIES},
        filename::generate_filename,
        template::{EntryTemplateVars, render_changelog_entry},
    },
};

/// Titles must be shorter than this.
pub const MAX_TITLE_CHARS: usize = 100;

const DEFAULT_DETAILS: &str = "## Additional Details\n\nAdd more details about this change here.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEntry {
    pub title: String,
    pub primary_category: String,
    pub secondary_categories: Vec<String>,
    pub summary: String,
    pub details: Option<String>,
}

fn canonical(value: &str, allowed: &[&str], kind: &str) -> Result<String> {
    allowed
        .iter()
        .find(|c| c.eq_ignore_ascii_case(value.trim()))
        .map(|c| c.to_string())
        .ok_or_else(|| {
            ChangelogError::invalid_config(format!(
                "unknown {kind} category '{value}', expected one of: {}",
                allowed.join(", ")
            ))
        })
}

impl NewEntry {
    /// Check the entry and return its front-matter categories, primary
    /// first and without repeats.
    pub fn validate(&self) -> Result<Vec<String>> {
        let title = self.title.trim();

        if title.is_empty() {
            return Err(ChangelogError::invalid_config("title is required"));
        }

        if title.chars().count() >= MAX_TITLE_CHARS {
            return Err(ChangelogError::invalid_config(format!(
                "title must be less than {MAX_TITLE_CHARS} characters"
            )));
        }

        if self.summary.trim().is_empty() {
            return Err(ChangelogError::invalid_config("summary is required"));
        }

        let mut categories =
            vec![canonical(&self.primary_category, &PRIMARY_CATEGORIES, "primary")?];

        for secondary in self.secondary_categories.iter() {
            let category = canonical(secondary, &SECONDARY_CATEGORIES, "secondary")?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        Ok(categories)
    }
}

/// Render and write a new entry below `repo_root`, returning its path.
pub fn create_entry(repo_root: &Path, entry: &NewEntry) -> Result<PathBuf> {
    let categories = entry.validate()?;

    let entries_dir = repo_root.join(ENTRIES_DIR);
    std::fs::create_dir_all(&entries_dir)?;

    let details = entry
        .details
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(DEFAULT_DETAILS);

    let content = render_changelog_entry(
        repo_root,
        &EntryTemplateVars {
            title: entry.title.trim().to_string(),
            categories,
            summary: entry.summary.clone(),
            detailed_content: details.to_string(),
        },
    )?;

    let file_name = generate_filename(entry.title.trim(), &entries_dir);
    let path = entries_dir.join(file_name);

    std::fs::write(&path, content)?;

    info!("created changelog entry: {}", path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::parse_changelog_entry;
    use tempfile::TempDir;

    fn new_entry() -> NewEntry {
        NewEntry {
            title: "Search API pagination".into(),
            primary_category: "api".into(),
            secondary_categories: vec!["Feature".into(), "feature".into()],
            summary: "Search results can now be paged.".into(),
            details: None,
        }
    }

    #[test]
    fn validates_categories() {
        assert_eq!(new_entry().validate().unwrap(), vec!["API", "Feature"]);

        let mut entry = new_entry();
        entry.primary_category = "Feature".into();
        assert!(matches!(
            entry.validate().unwrap_err(),
            ChangelogError::InvalidConfig(_)
        ));

        let mut entry = new_entry();
        entry.secondary_categories = vec!["Nope".into()];
        assert!(entry.validate().is_err());
    }

    #[test]
    fn requires_title_and_summary() {
        let mut entry = new_entry();
        entry.title = "   ".into();
        assert!(entry.validate().is_err());

        let mut entry = new_entry();
        entry.title = "x".repeat(MAX_TITLE_CHARS);
        assert!(entry.validate().is_err());

        entry.title = "x".repeat(MAX_TITLE_CHARS - 1);
        assert!(entry.validate().is_ok());

        let mut entry = new_entry();
        entry.summary = String::new();
        assert!(entry.validate().is_err());
    }

    #[test]
    fn writes_parseable_entry() {
        let dir = TempDir::new().unwrap();

        let path = create_entry(dir.path(), &new_entry()).unwrap();
        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.ends_with("-search-api-pagination.md"));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("## Additional Details"));

        let parsed = parse_changelog_entry(file_name, &raw).unwrap();
        assert_eq!(parsed.title, "Search API pagination");
        assert_eq!(parsed.categories, vec!["API", "Feature"]);
        assert!(parsed.summary.contains("Search results can now be paged."));

        let second = create_entry(dir.path(), &new_entry()).unwrap();
        assert!(second.exists());
        assert!(
            second
                .to_str()
                .unwrap()
                .ends_with("-search-api-pagination-1.md")
        );
    }
}
