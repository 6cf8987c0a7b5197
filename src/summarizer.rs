//! Condenses raw release notes into a short plain text digest.
use regex::Regex;
use std::sync::LazyLock;

use crate::{
    config::summarization::{SummarizationConfig, SummaryMode},
    text_helpers::truncate_with_ellipsis,
};

/// Digest used when nothing meaningful survives cleanup.
pub const FALLBACK_SUMMARY: &str = "Maintenance updates and improvements.";

/// Upper bound on bullets regardless of configuration.
const BULLET_CAP: usize = 10;

/// Patterns removed outright from release notes, applied in order.
static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Generated\s+with\s+\[?Speakeasy CLI[^\]\n]*\]?\([^)]*\)",
        r"(?i)Generated\s+by\s+Speakeasy\s+CLI[^\n]*",
        r"(?i)Publishing\s+Completed",
        r"(?i)https?://central\.sonatype\.com/artifact/[\w./-]+",
        r"(?i)https?://pypi\.org/project/[\w./-]+",
        r"(?i)https?://www\.npmjs\.com/package/[\w./-]+",
        r"(?i)\b(Java|Python|Typescript|Go)\s+SDK\s+Changes\s+Detected:?",
        r"(?i)##+\s+(Java|Python|Typescript|Go)\s+SDK\s+Changes[^\n]*",
        r"\(#[0-9]+\)",
        r"(?i)\(@[a-z0-9_-]+\)",
        r"\*\s*,\s*,\s*\*",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]*`").unwrap());

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#+[ \t]+.*$").unwrap());

static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:[•·*+]|\d+[.)])[ \t]+").unwrap());

static INLINE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x0B\x0C]{2,}").unwrap());

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+([.,;:])").unwrap());

static EXTRA_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip generator boilerplate, markup and references from release notes,
/// normalising list markers to `- `.
pub fn clean_release_notes(raw: &str) -> String {
    let mut text = raw.replace('\r', "");

    text = CODE_FENCE.replace_all(&text, " ").into_owned();

    for pattern in BOILERPLATE.iter() {
        text = pattern.replace_all(&text, " ").into_owned();
    }

    text = MARKDOWN_LINK.replace_all(&text, "$1").into_owned();
    text = INLINE_CODE.replace_all(&text, " ").into_owned();
    text = HTML_TAG.replace_all(&text, " ").into_owned();
    text = HEADING.replace_all(&text, " ").into_owned();
    text = BULLET_MARKER.replace_all(&text, "- ").into_owned();
    text = text.replace('\t', " ");
    text = INLINE_SPACES.replace_all(&text, " ").into_owned();
    text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1").into_owned();

    let text = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<&str>>()
        .join("\n");

    EXTRA_BLANK_LINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

fn has_letters(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic())
}

/// Local digest: up to `max_bullets` list items, else the leading prose
/// lines, cut to `max_chars` on a word boundary.
pub fn heuristic_summary(text: &str, max_bullets: usize, max_chars: usize) -> String {
    let cleaned = clean_release_notes(text);

    let lines = cleaned
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<&str>>();

    let bullets = lines
        .iter()
        .filter_map(|l| l.strip_prefix("- "))
        .map(str::trim)
        .filter(|b| has_letters(b))
        .take(max_bullets.min(BULLET_CAP))
        .map(|b| format!("- {b}"))
        .collect::<Vec<String>>();

    let digest = if !bullets.is_empty() {
        bullets.join("\n")
    } else {
        let mut prose = String::new();
        for line in lines.iter().filter(|l| !l.starts_with("- ")) {
            if prose.chars().count() >= max_chars {
                break;
            }
            if !prose.is_empty() {
                prose.push(' ');
            }
            prose.push_str(line);
        }
        prose
    };

    if digest.is_empty() || !has_letters(&digest) {
        return truncate_with_ellipsis(FALLBACK_SUMMARY, max_chars);
    }

    let digest = truncate_with_ellipsis(&digest, max_chars);

    if digest.trim().is_empty() {
        return truncate_with_ellipsis(FALLBACK_SUMMARY, max_chars);
    }

    digest
}

/// Summarize release notes according to `config`.
pub fn summarize_release(notes: &str, config: &SummarizationConfig) -> String {
    match config.mode {
        SummaryMode::Off => {
            let cleaned = clean_release_notes(notes);
            if cleaned.is_empty() {
                return truncate_with_ellipsis(FALLBACK_SUMMARY, config.max_chars);
            }
            truncate_with_ellipsis(&cleaned, config.max_chars)
        }
        SummaryMode::Heuristic => {
            heuristic_summary(notes, config.max_bullets, config.max_chars)
        }
        SummaryMode::Llm => {
            log::warn!(
                "hosted summarization is not available, using heuristic summary"
            );
            heuristic_summary(notes, config.max_bullets, config.max_chars)
        }
    }
}
