//! Changelog entry files: parsing, rendering and naming.
//!
//! Entries live in `changelog/entries/YYYY-MM-DD-<slug>[-N].md`. The file
//! name is the only source of an entry's date and identity, the front-matter
//! carries the title and categories.

/// Primary and secondary category taxonomy.
pub mod categories;

/// Validated creation of a new entry.
pub mod create;

/// Collision free entry file names.
pub mod filename;

/// Lookup of the newest published entry.
pub mod latest;

/// Summary / full content split and HTML rendering.
pub mod markdown;

/// Front-matter and body parsing.
pub mod parser;

/// Entry files proposed for creation.
pub mod proposed;

/// Placeholder substitution in the entry template.
pub mod template;

pub use create::{NewEntry, create_entry};
pub use latest::get_latest_changelog_entry_date;
pub use markdown::{ProcessedContent, process_changelog_content};
pub use parser::{ChangelogEntry, parse_changelog_entry};
pub use proposed::ProposedFile;

/// Entry directory relative to the repository root.
pub const ENTRIES_DIR: &str = "changelog/entries";
