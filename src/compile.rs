//! Build-time outputs compiled from the committed entries: the site data
//! file and the RSS feed derived from it.

pub mod json;
pub mod rss;

pub use json::{ChangelogData, compile_json};
pub use rss::compile_rss;

use std::path::PathBuf;

/// Site data file, relative to the repository root.
pub const DATA_FILE: &str = "src/data/changelog.json";
/// RSS feed, relative to the repository root.
pub const RSS_FILE: &str = "static/changelog.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Generated { path: PathBuf, entries: usize },
    /// Output is current, nothing was written
    Unchanged,
    NoEntries,
}
