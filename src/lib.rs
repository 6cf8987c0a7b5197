//! Changelog generator for the developer documentation site.
//!
//! Entries are Markdown files under `changelog/entries/`. They are compiled
//! into the site data file and RSS feed, and new ones are proposed from
//! upstream releases, merged pull requests and OpenAPI spec changes.
pub mod cli;
pub mod command;
pub mod compile;
pub mod config;
pub mod entry;
pub mod error;
pub mod forge;
pub mod openapi;
pub mod orchestrator;
pub mod summarizer;
pub mod text_helpers;

pub use error::{ChangelogError, Result};
pub use orchestrator::{Orchestrator, OrchestratorParams};
