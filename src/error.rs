//! Custom error types for the changelog generator.

use thiserror::Error;

/// Main error type for changelog generation.
#[derive(Error, Debug)]
pub enum ChangelogError {
    // Entry source errors
    #[error("Invalid changelog filename format: {0}")]
    InvalidFilename(String),

    #[error("Invalid date in filename: {0}")]
    InvalidDate(String),

    #[error("Invalid front-matter in {file}: {reason}")]
    InvalidFrontMatter { file: String, reason: String },

    #[error("Changelog template not found, searched: {0}")]
    TemplateNotFound(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing input file: {0}")]
    MissingInputFile(String),

    // Diff engine
    #[error("OpenAPI diff unavailable: {0}")]
    DiffUnavailable(String),

    // Forge / network errors
    #[error("Fetch failed: {0}")]
    FetchError(String),

    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    // Parsing errors - automatic conversions via #[from]
    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("XML write error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Datetime parse error: {0}")]
    ChronoParseError(#[from] chrono::ParseError),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ChangelogError
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a fetch error for a failed remote call
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::FetchError(msg.into())
    }

    /// Create a diff-unavailable error
    pub fn diff_unavailable(msg: impl Into<String>) -> Self {
        Self::DiffUnavailable(msg.into())
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for ChangelogError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = ChangelogError::InvalidFilename("notes.md".into());
        assert_eq!(
            err.to_string(),
            "Invalid changelog filename format: notes.md"
        );

        let err = ChangelogError::invalid_config("repos is empty");
        assert_eq!(err.to_string(), "Invalid configuration: repos is empty");
    }

    #[test]
    fn test_error_helpers() {
        let err = ChangelogError::forge("API call failed");
        assert!(matches!(err, ChangelogError::ForgeError(_)));

        let err = ChangelogError::fetch("timeout");
        assert!(matches!(err, ChangelogError::FetchError(_)));

        let err = ChangelogError::diff_unavailable("binary missing");
        assert!(matches!(err, ChangelogError::DiffUnavailable(_)));
    }

    #[test]
    fn test_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{");
        assert!(json_err.is_err());
        let err: ChangelogError = json_err.unwrap_err().into();
        assert!(matches!(err, ChangelogError::JsonParseError(_)));

        let io_err =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ChangelogError = io_err.into();
        assert!(matches!(err, ChangelogError::IoError(_)));
    }
}
