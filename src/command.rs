//! Subcommand implementations.

/// Shared setup: configuration, forge and orchestrator.
pub mod common;

/// Site data file and RSS feed generation.
pub mod compile;

/// Creation of a single entry from the template.
pub mod entry_new;

/// Upstream sync: preview, sync-all and publish.
pub mod sync;
