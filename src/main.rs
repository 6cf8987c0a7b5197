use changelog_generator::{Result, cli, command};
use clap::Parser;

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("changelog_generator")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    match &cli_args.command {
        cli::Command::EntryNew(entry) => {
            command::entry_new::execute(&cli_args, entry)
        }
        cli::Command::CompileJson => command::compile::execute_json(&cli_args),
        cli::Command::CompileRss => command::compile::execute_rss(&cli_args),
        cli::Command::SyncAll { dry_run } => {
            command::sync::sync_all(&cli_args, *dry_run).await
        }
        cli::Command::Preview => command::sync::preview(&cli_args).await,
        cli::Command::Publish { input } => {
            command::sync::publish(&cli_args, input.as_ref()).await
        }
    }
}
