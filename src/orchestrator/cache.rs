//! High-water mark of processed OpenAPI commits, kept between runs.
use log::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::Result;

pub const OPENAPI_CACHE_FILE: &str = ".changelog-openapi-cache.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiCache {
    pub latest_processed_sha: Option<String>,
}

/// Read the cached SHA. A missing or unreadable cache is treated as empty.
pub async fn read_openapi_cache(repo_root: &Path) -> Option<String> {
    let path = repo_root.join(OPENAPI_CACHE_FILE);

    let content = fs::read_to_string(&path).await.ok()?;

    match serde_json::from_str::<OpenApiCache>(&content) {
        Ok(cache) => cache.latest_processed_sha.filter(|s| !s.is_empty()),
        Err(err) => {
            warn!("ignoring unreadable {}: {err}", path.display());
            None
        }
    }
}

pub async fn write_openapi_cache(repo_root: &Path, sha: &str) -> Result<()> {
    let cache = OpenApiCache {
        latest_processed_sha: Some(sha.to_string()),
    };

    let content = serde_json::to_string_pretty(&cache)?;
    fs::write(repo_root.join(OPENAPI_CACHE_FILE), format!("{content}\n")).await?;

    debug!("recorded openapi high-water mark {sha}");

    Ok(())
}
