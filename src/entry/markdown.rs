use pulldown_cmark::{Event, Options, Parser, html};
use serde::{Deserialize, Serialize};

use crate::text_helpers::{ELLIPSIS, truncate_at_word};

/// Accepted spellings of the in-body truncation marker.
pub const TRUNCATE_MARKERS: [&str; 3] =
    ["{/* truncate */}", "<!-- truncate -->", "<!-- more -->"];

/// Bodies longer than this are cut for their summary.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Summary and full HTML rendering of an entry body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedContent {
    pub summary: String,
    pub full_content: String,
    /// Whether `summary` is a proper prefix of `full_content`
    pub has_truncation: bool,
}

/// Render Markdown to HTML with GitHub flavored extensions, treating every
/// newline as a line break.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_GFM);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

/// Locate the earliest truncation marker in `content`.
fn find_marker(content: &str) -> Option<(usize, &'static str)> {
    TRUNCATE_MARKERS
        .iter()
        .filter_map(|marker| content.find(marker).map(|idx| (idx, *marker)))
        .min_by_key(|(idx, _)| *idx)
}

/// Split an entry body into its summary and full rendering.
///
/// In priority order: an explicit truncation marker, the first of several
/// paragraphs, a word boundary cut of long single paragraphs, and finally
/// the whole text when it is short.
pub fn process_changelog_content(content: &str) -> ProcessedContent {
    let content = content.replace("\r\n", "\n");

    if let Some((idx, marker)) = find_marker(&content) {
        let before = &content[..idx];
        let mut full = format!("{before}{}", &content[idx + marker.len()..]);
        for other in TRUNCATE_MARKERS {
            full = full.replace(other, "");
        }

        return ProcessedContent {
            summary: markdown_to_html(before.trim()),
            full_content: markdown_to_html(full.trim()),
            has_truncation: true,
        };
    }

    let paragraphs = content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<&str>>();

    if paragraphs.len() > 1 {
        return ProcessedContent {
            summary: markdown_to_html(paragraphs[0]),
            full_content: markdown_to_html(&content),
            has_truncation: true,
        };
    }

    if content.chars().count() > SUMMARY_MAX_CHARS {
        let cut = truncate_at_word(&content, SUMMARY_MAX_CHARS);
        return ProcessedContent {
            summary: markdown_to_html(&format!("{cut}{ELLIPSIS}")),
            full_content: markdown_to_html(&content),
            has_truncation: true,
        };
    }

    let html = markdown_to_html(&content);

    ProcessedContent {
        summary: html.clone(),
        full_content: html,
        has_truncation: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_markdown() {
        let html = markdown_to_html("**bold** text");
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn renders_newlines_as_breaks() {
        let html = markdown_to_html("line one\nline two");
        assert!(html.contains("<br />"));
    }

    #[test]
    fn renders_gfm_tables() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn handles_truncate_marker() {
        let content =
            "Summary text\n\n{/* truncate */}\n\nDetailed content here";
        let result = process_changelog_content(content);

        assert!(result.has_truncation);
        assert!(result.summary.contains("Summary text"));
        assert!(!result.summary.contains("Detailed content"));
        assert!(result.full_content.contains("Detailed content"));
        assert!(!result.full_content.contains("truncate"));
    }

    #[test]
    fn summary_never_contains_any_marker() {
        for marker in TRUNCATE_MARKERS {
            let content = format!(
                "Intro paragraph\n\n{marker}\n\nMore\n\n<!-- more -->\n\nRest"
            );
            let result = process_changelog_content(&content);

            assert!(result.has_truncation);
            for other in TRUNCATE_MARKERS {
                assert!(!result.summary.contains(other));
                assert!(!result.full_content.contains(other));
            }
        }
    }

    #[test]
    fn splits_on_earliest_marker() {
        let content = "First <!-- more --> second {/* truncate */} third";
        let result = process_changelog_content(content);

        assert!(result.summary.contains("First"));
        assert!(!result.summary.contains("second"));
        assert!(result.full_content.contains("third"));
    }

    #[test]
    fn handles_multiple_paragraphs() {
        let content = "First paragraph\n\nSecond paragraph\n\nThird paragraph";
        let result = process_changelog_content(content);

        assert!(result.has_truncation);
        assert!(result.summary.contains("First paragraph"));
        assert!(!result.summary.contains("Second paragraph"));
        assert!(result.full_content.contains("Second paragraph"));
    }

    #[test]
    fn trailing_blank_lines_are_not_paragraphs() {
        let result = process_changelog_content("Only paragraph\n\n\n");
        assert!(!result.has_truncation);
        assert_eq!(result.summary, result.full_content);
    }

    #[test]
    fn handles_long_content_without_spaces() {
        let content = "a".repeat(250);
        let result = process_changelog_content(&content);

        assert!(result.has_truncation);
        assert!(result.summary.len() < result.full_content.len());
        assert!(result.summary.contains(&format!("{}...", "a".repeat(200))));
    }

    #[test]
    fn long_content_cut_on_word_boundary() {
        let content = "word ".repeat(60);
        let result = process_changelog_content(content.trim());

        assert!(result.has_truncation);
        assert!(result.summary.contains("word..."));
        assert!(!result.summary.contains("wor..."));
    }

    #[test]
    fn handles_short_content() {
        let result = process_changelog_content("Short content");

        assert!(!result.has_truncation);
        assert_eq!(result.summary, result.full_content);
    }
}
