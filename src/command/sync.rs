//! `preview`, `sync-all` and `publish` command implementations.
use log::*;
use std::path::{Path, PathBuf};

use crate::{
    Result, cli,
    command::common,
    orchestrator::{
        AnalyzeOutput, ApplyInput, ApplyOutcome, HANDOFF_FILE, Orchestrator,
        write_analysis, write_preview,
    },
};

fn print_analysis(output: &AnalyzeOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

fn log_report(output: &AnalyzeOutput) {
    let stats = &output.report.stats;
    info!(
        "processed {}: {} included, {} skipped, {} errors",
        stats.total_processed,
        stats.included_count,
        stats.skipped_count,
        stats.error_count
    );

    for item in output.report.errors.iter() {
        warn!(
            "{} {} {}: {}",
            item.kind,
            item.repo,
            item.id,
            item.reason.as_deref().unwrap_or_default()
        );
    }
}

fn log_outcome(outcome: &ApplyOutcome) {
    match outcome {
        ApplyOutcome::NothingToApply => {
            info!("changelog is up-to-date: nothing to apply")
        }
        ApplyOutcome::Applied {
            pr_number,
            pr_url,
            files,
            updated,
            ..
        } => {
            let verb = if *updated { "updated" } else { "opened" };
            info!("{verb} pr #{pr_number} with {files} files: {pr_url}");
        }
    }
}

/// Print the analysis without writing anything.
pub async fn preview(args: &cli::Args) -> Result<()> {
    let orchestrator = common::build_orchestrator(args)?;
    let output = orchestrator.analyze().await?;
    log_report(&output);
    print_analysis(&output)
}

async fn dry_run(orchestrator: &Orchestrator, output: &AnalyzeOutput) -> Result<()> {
    let preview = write_preview(orchestrator.repo_root(), &output.files).await?;

    print_analysis(output)?;

    for file in output.files.iter() {
        info!(
            "{} ({} bytes)",
            preview.join(file.file_name()).display(),
            file.content.len()
        );
        debug!("{}:\n{}", file.path, file.content);
    }

    Ok(())
}

/// Analyze and apply in one run. The analysis passes through the hand-off
/// file, which is removed afterwards whether or not apply succeeded.
pub async fn sync_all(args: &cli::Args, dry_run_only: bool) -> Result<()> {
    let orchestrator = common::build_orchestrator(args)?;
    let output = orchestrator.analyze().await?;
    log_report(&output);

    if dry_run_only {
        return dry_run(&orchestrator, &output).await;
    }

    let handoff = args.repo_root.join(HANDOFF_FILE);
    write_analysis(&handoff, &output).await?;

    let result = orchestrator.apply(ApplyInput::File(handoff.clone())).await;

    if let Err(err) = tokio::fs::remove_file(&handoff).await {
        warn!("failed to remove {}: {err}", handoff.display());
    }

    log_outcome(&result?);

    Ok(())
}

fn resolve_input(repo_root: &Path, input: Option<&PathBuf>) -> Option<PathBuf> {
    match input {
        Some(path) => Some(path.clone()),
        None => {
            let default = repo_root.join(HANDOFF_FILE);
            default.exists().then_some(default)
        }
    }
}

/// Apply a saved analysis, or analyze afresh when there is none.
pub async fn publish(args: &cli::Args, input: Option<&PathBuf>) -> Result<()> {
    let orchestrator = common::build_orchestrator(args)?;

    let apply_input = match resolve_input(&args.repo_root, input) {
        Some(path) => {
            info!("publishing analysis from {}", path.display());
            ApplyInput::File(path)
        }
        None => {
            info!("no saved analysis found: analyzing");
            let output = orchestrator.analyze().await?;
            log_report(&output);
            ApplyInput::Output(Box::new(output))
        }
    };

    let outcome = orchestrator.apply(apply_input).await?;
    log_outcome(&outcome);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolves_publish_input() {
        let dir = TempDir::new().unwrap();
        let explicit = PathBuf::from("saved.json");

        assert_eq!(
            resolve_input(dir.path(), Some(&explicit)),
            Some(explicit.clone())
        );
        assert_eq!(resolve_input(dir.path(), None), None);

        std::fs::write(dir.path().join(HANDOFF_FILE), "{}").unwrap();
        assert_eq!(
            resolve_input(dir.path(), None),
            Some(dir.path().join(HANDOFF_FILE))
        );
    }
}
