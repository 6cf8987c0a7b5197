//! Turns a diff report into a one line summary and a short detail list.
use serde::Serialize;
use std::{collections::BTreeSet, fmt};

use crate::openapi::diff::{DiffChange, OpenApiDiff};

/// Summary used when a diff names nothing countable.
pub const GENERIC_SUMMARY: &str = "OpenAPI specification updated";
/// Maximum number of detail lines kept.
pub const MAX_DETAILS: usize = 10;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    Endpoints,
    Fields,
    Parameters,
}

impl ChangeCategory {
    fn noun(&self) -> &'static str {
        match self {
            ChangeCategory::Endpoints => "endpoint",
            ChangeCategory::Fields => "field",
            ChangeCategory::Parameters => "parameter",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.noun())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Added,
    Removed,
    Modified,
}

impl Action {
    fn of(change_text: &str) -> Self {
        if change_text.contains("added") {
            Action::Added
        } else if change_text.contains("removed") {
            Action::Removed
        } else {
            Action::Modified
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Action::Added => "added",
            Action::Removed => "removed",
            Action::Modified => "modified",
        }
    }
}

/// Condensed view of a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedChanges {
    pub categories: BTreeSet<ChangeCategory>,
    pub summary: String,
    pub details: Vec<String>,
    pub breaking: bool,
}

impl Default for AnalyzedChanges {
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            summary: GENERIC_SUMMARY.into(),
            details: vec![],
            breaking: false,
        }
    }
}

fn categorize(property: &str) -> Option<ChangeCategory> {
    if property == "path" {
        Some(ChangeCategory::Endpoints)
    } else if property.contains("parameter") {
        Some(ChangeCategory::Parameters)
    } else if property == "properties"
        || property == "schema"
        || property.contains("response")
        || property.contains("request")
    {
        Some(ChangeCategory::Fields)
    } else {
        None
    }
}

fn detail(category: ChangeCategory, action: Action, change: &DiffChange) -> Option<String> {
    let subject = match action {
        Action::Added => change.new_text(),
        Action::Removed => change.original_text(),
        Action::Modified => change.new_text().or_else(|| change.original_text()),
    }?;

    let verb = match action {
        Action::Added => "Added",
        Action::Removed => "Removed",
        Action::Modified => "Modified",
    };

    Some(format!("{verb} {}: {subject}", category.noun()))
}

fn count_phrase(category: ChangeCategory, action: Action, count: usize) -> String {
    let plural = if count > 1 { "s" } else { "" };
    format!("{count} {}{plural} {}", category.noun(), action.verb())
}

/// Summarize the changes of a diff report.
pub fn analyze_openapi_changes(changes: &[DiffChange]) -> AnalyzedChanges {
    let mut analyzed = AnalyzedChanges::default();
    let mut counts: Vec<((ChangeCategory, Action), usize)> = vec![];

    for change in changes {
        if change.breaking {
            analyzed.breaking = true;
        }

        let Some(category) = categorize(&change.property) else {
            continue;
        };
        let action = Action::of(&change.change_text);

        analyzed.categories.insert(category);

        match counts.iter_mut().find(|(key, _)| *key == (category, action)) {
            Some((_, count)) => *count += 1,
            None => counts.push(((category, action), 1)),
        }

        if let Some(line) = detail(category, action, change) {
            analyzed.details.push(line);
        }
    }

    analyzed.details.truncate(MAX_DETAILS);

    let order = [Action::Added, Action::Removed, Action::Modified];
    let mut parts = vec![];

    for category in [
        ChangeCategory::Endpoints,
        ChangeCategory::Fields,
        ChangeCategory::Parameters,
    ] {
        for action in order {
            if let Some((_, count)) =
                counts.iter().find(|(key, _)| *key == (category, action))
            {
                parts.push(count_phrase(category, action, *count));
            }
        }
    }

    if !parts.is_empty() {
        let joined = parts.join(", ");
        analyzed.summary = if analyzed.breaking {
            format!("⚠️ Breaking: {joined}")
        } else {
            joined
        };
    }

    analyzed
}

impl From<&OpenApiDiff> for AnalyzedChanges {
    fn from(diff: &OpenApiDiff) -> Self {
        analyze_openapi_changes(&diff.changes)
    }
}

/// Comma separated category names in a fixed order, `schema` when empty.
pub fn format_change_categories(categories: &BTreeSet<ChangeCategory>) -> String {
    if categories.is_empty() {
        return "schema".into();
    }

    categories
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(property: &str, text: &str, new: Option<&str>, original: Option<&str>) -> DiffChange {
        DiffChange {
            property: property.into(),
            change_text: text.into(),
            breaking: false,
            new: new.map(|n| json!(n)),
            original: original.map(|o| json!(o)),
        }
    }

    #[test]
    fn empty_diff_is_generic() {
        let analyzed = analyze_openapi_changes(&[]);
        assert_eq!(analyzed.summary, GENERIC_SUMMARY);
        assert!(analyzed.categories.is_empty());
        assert!(!analyzed.breaking);
        assert_eq!(format_change_categories(&analyzed.categories), "schema");
    }

    #[test]
    fn counts_and_describes_changes() {
        let analyzed = analyze_openapi_changes(&[
            change("path", "path added", Some("/v1/widgets"), None),
            change("path", "path added", Some("/v1/gadgets"), None),
            change("properties", "property removed", None, Some("legacyId")),
            change("parameters", "parameter changed", Some("limit"), None),
            change("description", "description changed", Some("x"), None),
        ]);

        assert_eq!(
            analyzed.summary,
            "2 endpoints added, 1 field removed, 1 parameter modified"
        );
        assert_eq!(
            analyzed.details,
            vec![
                "Added endpoint: /v1/widgets",
                "Added endpoint: /v1/gadgets",
                "Removed field: legacyId",
                "Modified parameter: limit",
            ]
        );
        assert_eq!(
            format_change_categories(&analyzed.categories),
            "endpoints, fields, parameters"
        );
    }

    #[test]
    fn breaking_changes_are_flagged() {
        let mut removed = change("path", "path removed", None, Some("/v1/old"));
        removed.breaking = true;

        let analyzed = analyze_openapi_changes(&[removed]);
        assert!(analyzed.breaking);
        assert_eq!(analyzed.summary, "⚠️ Breaking: 1 endpoint removed");
    }

    #[test]
    fn details_are_capped() {
        let changes = (0..15)
            .map(|i| change("path", "added", Some(&format!("/v1/e{i}")), None))
            .collect::<Vec<DiffChange>>();

        let analyzed = analyze_openapi_changes(&changes);
        assert_eq!(analyzed.details.len(), MAX_DETAILS);
        assert_eq!(analyzed.summary, "15 endpoints added");
    }
}
