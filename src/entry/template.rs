use regex::{Captures, Regex};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use crate::{ChangelogError, Result, entry::categories::format_categories};

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").unwrap());

/// Template shipped with this package.
pub const PACKAGED_TEMPLATE: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/templates/changelog-entry.md");

/// Repository relative fallback location of the template.
pub const REPO_TEMPLATE: &str = "scripts/templates/changelog-entry.md";

/// Values substituted into the entry template.
#[derive(Debug, Clone, Default)]
pub struct EntryTemplateVars {
    pub title: String,
    pub categories: Vec<String>,
    pub summary: String,
    pub detailed_content: String,
}

/// Finds the entry template on disk.
#[derive(Debug, Clone)]
pub struct TemplateLocator {
    candidates: Vec<PathBuf>,
}

impl TemplateLocator {
    /// Packaged template first, then the repository fallback.
    pub fn for_repo(repo_root: &Path) -> Self {
        Self {
            candidates: vec![
                PathBuf::from(PACKAGED_TEMPLATE),
                repo_root.join(REPO_TEMPLATE),
            ],
        }
    }

    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn resolve(&self) -> Result<PathBuf> {
        self.candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                ChangelogError::TemplateNotFound(
                    self.candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<String>>()
                        .join(", "),
                )
            })
    }

    pub fn load(&self) -> Result<String> {
        let path = self.resolve()?;
        log::debug!("using changelog template: {}", path.display());
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Replace `{{NAME}}` tokens. Unknown tokens are left verbatim.
pub fn substitute(template: &str, variables: &HashMap<&str, String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            variables
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Render entry text from an already loaded template.
pub fn render_template(template: &str, vars: &EntryTemplateVars) -> String {
    let title = vars.title.trim().replace('\\', "\\\\").replace('"', "\\\"");

    let variables = HashMap::from([
        ("TITLE", title),
        ("CATEGORIES", format_categories(&vars.categories).trim().to_string()),
        ("SUMMARY", vars.summary.trim().to_string()),
        ("DETAILED_CONTENT", vars.detailed_content.trim().to_string()),
    ]);

    substitute(template, &variables)
}

/// Load the template for `repo_root` and render a new entry.
pub fn render_changelog_entry(
    repo_root: &Path,
    vars: &EntryTemplateVars,
) -> Result<String> {
    let template = TemplateLocator::for_repo(repo_root).load()?;
    Ok(render_template(&template, vars))
}
