//! Tests for the orchestrator module.
//!
//! - `common`: shared fixtures
//! - `analyze`: classification and proposed entries
//! - `apply`: file writes and pull request workflow

mod common;
