//! Access to the GitHub API.
//!
//! Releases, pull requests, commits and file contents are read through the
//! [`traits::Forge`] trait; the changelog branch and pull request are
//! written through it as well.

/// Connection and authentication settings.
pub mod config;

/// GitHub API client implementation.
pub mod github;

/// Request and response types shared by forge implementations.
pub mod request;

/// Forge abstraction.
pub mod traits;
