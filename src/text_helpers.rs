//! Small text utilities shared by the markdown processor and the release
//! summarizer.

/// Ellipsis appended to shortened text.
pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_chars` characters, then back up to the last
/// space so no word is split. Without any space the hard cut is kept.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    let cut = cut.trim();

    match cut.rfind(' ') {
        Some(idx) if idx > 0 => cut[..idx].trim_end().to_string(),
        _ => cut.to_string(),
    }
}

/// Shorten `text` so that the result, ellipsis included, never exceeds
/// `max_chars` characters. Text that already fits is returned unchanged.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }

    let budget = max_chars - ELLIPSIS.len();
    format!("{}{ELLIPSIS}", truncate_at_word(text, budget))
}
