//! Sync workflow: analyze upstream repositories into proposed changelog
//! entries, then apply them as a single pull request on the target
//! repository.
use chrono::NaiveDate;
use derive_builder::Builder;
use std::{path::PathBuf, rc::Rc};

use crate::{
    ChangelogError, Result, config::Config, entry::filename::current_date,
    forge::traits::Forge, openapi::SpecDiffer,
};

pub mod analyze;
pub mod apply;
pub mod cache;
pub mod pr_body;
pub mod types;

pub use apply::{HANDOFF_FILE, PREVIEW_DIR, read_analysis, write_analysis, write_preview};
pub use types::{AnalyzeOutput, ApplyInput, ApplyOutcome, Report, ReportItem};

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub config: Rc<Config>,
    pub forge: Rc<dyn Forge>,
    pub repo_root: PathBuf,
    /// Diff engine override, located on `PATH` when absent
    #[builder(default)]
    pub differ: Option<Rc<dyn SpecDiffer>>,
    /// Run date used for the branch name and PR title
    #[builder(default = "current_date()")]
    pub today: NaiveDate,
}

impl OrchestratorParamsBuilder {
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            ChangelogError::invalid_config(format!(
                "Failed to build orchestrator: {}",
                e
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

pub struct Orchestrator {
    config: Rc<Config>,
    forge: Rc<dyn Forge>,
    repo_root: PathBuf,
    differ: Option<Rc<dyn SpecDiffer>>,
    today: NaiveDate,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            config: Rc::clone(&params.config),
            forge: Rc::clone(&params.forge),
            repo_root: params.repo_root,
            differ: params.differ,
            today: params.today,
        }
    }

    pub fn repo_root(&self) -> &std::path::Path {
        &self.repo_root
    }
}

#[cfg(test)]
mod tests;
