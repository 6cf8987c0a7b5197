pub const PRIMARY_CATEGORIES: [&str; 5] =
    ["API", "SDK", "MCP", "Website", "Documentation"];

pub const SECONDARY_CATEGORIES: [&str; 6] = [
    "Feature",
    "Enhancement",
    "Bug Fix",
    "Breaking",
    "Security",
    "Deprecation",
];

/// Render categories as a quoted, comma separated list for front-matter.
pub fn format_categories<S: AsRef<str>>(categories: &[S]) -> String {
    categories
        .iter()
        .map(|c| format!("\"{}\"", c.as_ref()))
        .collect::<Vec<String>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_categories() {
        assert_eq!(format_categories(&["API"]), r#""API""#);
        assert_eq!(format_categories(&["API", "Feature"]), r#""API", "Feature""#);
        assert_eq!(
            format_categories(&["SDK", "Breaking", "Enhancement"]),
            r#""SDK", "Breaking", "Enhancement""#
        );
        assert_eq!(format_categories::<&str>(&[]), "");
    }

    #[test]
    fn taxonomy_contains_expected_values() {
        assert!(PRIMARY_CATEGORIES.contains(&"MCP"));
        assert!(SECONDARY_CATEGORIES.contains(&"Bug Fix"));
        assert!(SECONDARY_CATEGORIES.contains(&"Breaking"));
    }
}
