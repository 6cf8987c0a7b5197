//! `compile-json` and `compile-rss` command implementations.
use log::*;

use crate::{
    Result, cli,
    command::common,
    compile::{
        CompileOutcome, compile_json, compile_rss, json::JsonPaths,
        rss::RssPaths,
    },
};

fn log_outcome(what: &str, outcome: &CompileOutcome) {
    match outcome {
        CompileOutcome::Generated { path, entries } => {
            info!("{what}: wrote {entries} entries to {}", path.display())
        }
        CompileOutcome::Unchanged => info!("{what}: up-to-date"),
        CompileOutcome::NoEntries => warn!("{what}: no entries to compile"),
    }
}

/// Compile entries into the site data file.
pub fn execute_json(args: &cli::Args) -> Result<()> {
    let outcome = compile_json(&JsonPaths::for_repo(&args.repo_root))?;
    log_outcome("compile-json", &outcome);
    Ok(())
}

/// Regenerate the RSS feed from the site data file.
pub fn execute_rss(args: &cli::Args) -> Result<()> {
    let config = common::load_configuration(args)?;
    let outcome =
        compile_rss(&RssPaths::for_repo(&args.repo_root), &config.feed)?;
    log_outcome("compile-rss", &outcome);
    Ok(())
}
