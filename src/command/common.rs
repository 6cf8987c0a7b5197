//! Common functionality shared between commands
use log::*;
use std::rc::Rc;

use crate::{
    Result, cli,
    config::Config,
    forge::{github::Github, traits::Forge},
    orchestrator::Orchestrator,
};

/// Load the configuration for the repository root given on the command
/// line.
pub fn load_configuration(args: &cli::Args) -> Result<Config> {
    let config = Config::load(&args.repo_root)?;
    debug!(
        "loaded configuration: owner {}, {} source repositories",
        config.owner,
        config.repos.len()
    );
    Ok(config)
}

/// Create the GitHub forge from the CLI token.
pub fn create_forge(args: &cli::Args) -> Result<Rc<dyn Forge>> {
    let remote = args.remote()?;
    Ok(Rc::new(Github::new(remote)?))
}

/// Wire configuration and forge into an orchestrator.
pub fn build_orchestrator(args: &cli::Args) -> Result<Orchestrator> {
    let config = load_configuration(args)?;
    let forge = create_forge(args)?;

    Orchestrator::builder()
        .config(Rc::new(config))
        .forge(forge)
        .repo_root(args.repo_root.clone())
        .build()
}
