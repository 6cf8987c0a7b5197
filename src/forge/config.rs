//! Configuration for GitHub API connections.
use secrecy::{ExposeSecret, SecretString};
use std::env;

use crate::{ChangelogError, Result};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Default API host.
pub const DEFAULT_HOST: &str = "github.com";
/// Default page size for paginated queries.
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Branch name prefix of changelog sync pull requests.
pub const SYNC_BRANCH_PREFIX: &str = "changelog/sync-";

/// Remote connection configuration for the GitHub API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            scheme: "https".into(),
            token: SecretString::from(String::new()),
        }
    }
}

impl RemoteConfig {
    /// Build a config for github.com using `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let token = env::var(TOKEN_ENV).unwrap_or_default();
        Self::with_token(SecretString::from(token))
    }

    pub fn with_token(token: SecretString) -> Result<Self> {
        if token.expose_secret().trim().is_empty() {
            return Err(ChangelogError::invalid_config(format!(
                "{TOKEN_ENV} must be set for commands that reach GitHub"
            )));
        }

        Ok(Self {
            token,
            ..Default::default()
        })
    }

    /// REST API base, `api.github.com` for the public host.
    pub fn api_base_uri(&self) -> String {
        format!("{}://api.{}", self.scheme, self.host)
    }
}
