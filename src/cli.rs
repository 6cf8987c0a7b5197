//! CLI argument parsing.
use clap::{Args as ClapArgs, Parser, Subcommand};
use secrecy::SecretString;
use std::path::PathBuf;

use crate::{
    Result,
    entry::NewEntry,
    forge::config::{RemoteConfig, TOKEN_ENV},
};

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = ".", global = true)]
    /// Root of the documentation site repository.
    pub repo_root: PathBuf,

    #[arg(long, env = TOKEN_ENV, hide_env_values = true, global = true)]
    /// GitHub token. Only needed by commands that reach GitHub.
    pub github_token: Option<String>,

    #[arg(long, env = "DEBUG", default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Changelog subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new changelog entry from the template.
    EntryNew(EntryNewArgs),

    /// Compile entries into the site data file.
    CompileJson,

    /// Generate the RSS feed from the site data file.
    CompileRss,

    /// Analyze upstream repositories and open or update the changelog PR.
    SyncAll {
        #[arg(long, default_value_t = false)]
        /// Write proposed entries to the preview directory instead.
        dry_run: bool,
    },

    /// Print the analysis as JSON without writing anything.
    Preview,

    /// Apply a saved analysis, or a fresh one when no file exists.
    Publish {
        #[arg(long)]
        /// Analysis file, defaults to the sync hand-off file.
        input: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EntryNewArgs {
    #[arg(long)]
    /// Entry title, less than 100 characters.
    pub title: String,

    #[arg(long)]
    /// Primary category: API, SDK, MCP, Website or Documentation.
    pub category: String,

    #[arg(long = "secondary", value_delimiter = ',')]
    /// Secondary categories, repeatable or comma separated.
    pub secondary: Vec<String>,

    #[arg(long)]
    /// One or two sentence summary shown above the fold.
    pub summary: String,

    #[arg(long)]
    /// Detailed Markdown content, defaults to a scaffold.
    pub details: Option<String>,
}

impl From<EntryNewArgs> for NewEntry {
    fn from(args: EntryNewArgs) -> Self {
        NewEntry {
            title: args.title,
            primary_category: args.category,
            secondary_categories: args.secondary,
            summary: args.summary,
            details: args.details,
        }
    }
}

impl Args {
    /// GitHub connection from `--github-token` / `GITHUB_TOKEN`.
    pub fn remote(&self) -> Result<RemoteConfig> {
        let token = self.github_token.clone().unwrap_or_default();
        RemoteConfig::with_token(SecretString::from(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entry_new() {
        let args = Args::try_parse_from([
            "changelog-generator",
            "entry-new",
            "--title",
            "New thing",
            "--category",
            "API",
            "--secondary",
            "Feature,Bug Fix",
            "--summary",
            "Summary.",
        ])
        .unwrap();

        let Command::EntryNew(entry) = args.command else {
            panic!("expected entry-new");
        };

        let entry = NewEntry::from(entry);
        assert_eq!(entry.secondary_categories, vec!["Feature", "Bug Fix"]);
        assert_eq!(entry.details, None);
    }

    #[test]
    fn parses_sync_flags() {
        let args = Args::try_parse_from([
            "changelog-generator",
            "sync-all",
            "--dry-run",
            "--repo-root",
            "/tmp/site",
        ])
        .unwrap();

        assert!(matches!(args.command, Command::SyncAll { dry_run: true }));
        assert_eq!(args.repo_root, PathBuf::from("/tmp/site"));

        let args =
            Args::try_parse_from(["changelog-generator", "publish", "--input", "out.json"])
                .unwrap();
        assert!(matches!(
            args.command,
            Command::Publish { input: Some(ref p) } if p == &PathBuf::from("out.json")
        ));
    }

    #[test]
    fn missing_token_is_invalid() {
        let args = Args {
            repo_root: PathBuf::from("."),
            github_token: None,
            debug: false,
            command: Command::Preview,
        };

        assert!(args.remote().is_err());
    }
}
