//! Runs the external `openapi-changes` tool against two spec revisions.
use serde::Deserialize;
use serde_json::Value;
use std::{
    env,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};
#[cfg(test)]
use mockall::automock;

use crate::{ChangelogError, Result};

/// Environment variable overriding the diff binary location.
pub const DIFF_BIN_ENV: &str = "OPENAPI_CHANGES_BIN";
/// Binary looked up on `PATH` when nothing else is configured.
pub const DEFAULT_DIFF_BIN: &str = "openapi-changes";

const TEMP_PREFIX: &str = "openapi-changes-";

/// Structural diff engine for two OpenAPI documents.
#[cfg_attr(test, automock)]
pub trait SpecDiffer: Send + Sync {
    /// Diff `base` against `head`. Any failure is reported as
    /// [`ChangelogError::DiffUnavailable`].
    fn diff(&self, base: &str, head: &str) -> Result<OpenApiDiff>;
}

/// One change reported by the diff engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffChange {
    #[serde(default)]
    pub property: String,
    #[serde(default)]
    pub change_text: String,
    #[serde(default)]
    pub breaking: bool,
    #[serde(default)]
    pub new: Option<Value>,
    #[serde(default)]
    pub original: Option<Value>,
}

fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl DiffChange {
    pub fn new_text(&self) -> Option<String> {
        value_text(self.new.as_ref())
    }

    pub fn original_text(&self) -> Option<String> {
        value_text(self.original.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct DiffReport {
    #[serde(default)]
    changes: Vec<DiffChange>,
}

/// Validated diff engine output. `raw` keeps the complete report.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiDiff {
    pub changes: Vec<DiffChange>,
    pub raw: Value,
}

impl OpenApiDiff {
    /// Validate engine stdout. The root must be a JSON object and
    /// `changes`, when present, a list of change objects.
    pub fn parse(stdout: &str) -> Result<Self> {
        if stdout.trim().is_empty() {
            return Err(ChangelogError::diff_unavailable("empty output"));
        }

        let raw: Value = serde_json::from_str(stdout).map_err(|e| {
            ChangelogError::diff_unavailable(format!("invalid json: {e}"))
        })?;

        if !raw.is_object() {
            return Err(ChangelogError::diff_unavailable(
                "report is not a json object",
            ));
        }

        let report: DiffReport =
            serde_json::from_value(raw.clone()).map_err(|e| {
                ChangelogError::diff_unavailable(format!(
                    "unexpected report shape: {e}"
                ))
            })?;

        Ok(Self {
            changes: report.changes,
            raw,
        })
    }
}

/// [`SpecDiffer`] backed by the `openapi-changes` command line tool.
#[derive(Debug, Clone)]
pub struct OpenApiChangesRunner {
    bin: PathBuf,
}

impl OpenApiChangesRunner {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Locate the binary: `OPENAPI_CHANGES_BIN`, then `configured`, then a
    /// `PATH` lookup. `None` when none of them yields a binary.
    pub fn locate(configured: Option<&str>) -> Option<Self> {
        let from_env = env::var(DIFF_BIN_ENV).ok().filter(|b| !b.trim().is_empty());

        if let Some(bin) = from_env.or(configured.map(String::from)) {
            return Some(Self::new(bin));
        }

        match which::which(DEFAULT_DIFF_BIN) {
            Ok(path) => Some(Self::new(path)),
            Err(_) => {
                log::debug!("{DEFAULT_DIFF_BIN} not found on PATH");
                None
            }
        }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }
}

impl SpecDiffer for OpenApiChangesRunner {
    fn diff(&self, base: &str, head: &str) -> Result<OpenApiDiff> {
        // removed on drop, whichever way this function returns
        let tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .map_err(|e| {
                ChangelogError::diff_unavailable(format!("temp dir: {e}"))
            })?;

        let base_file = tmp.path().join("base.yaml");
        let head_file = tmp.path().join("head.yaml");

        std::fs::write(&base_file, base)
            .and_then(|_| std::fs::write(&head_file, head))
            .map_err(|e| {
                ChangelogError::diff_unavailable(format!("write spec: {e}"))
            })?;

        log::debug!("running {} diff", self.bin.display());

        let output = Command::new(&self.bin)
            .args(["diff", "--format", "json"])
            .arg(&base_file)
            .arg(&head_file)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ChangelogError::diff_unavailable(format!(
                    "failed to run {}: {e}",
                    self.bin.display()
                ))
            })?;

        if !output.status.success() {
            return Err(ChangelogError::diff_unavailable(format!(
                "{} exited with {}: {}",
                self.bin.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        OpenApiDiff::parse(&String::from_utf8_lossy(&output.stdout))
    }
}
