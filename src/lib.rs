//! Logbook - keeps a project's changelog in sync with merged pull requests.
//!
//! This library provides the core functionality for the `lbk` CLI tool:
//! parsing the changelog's managed `## [Unreleased]` region, acquiring
//! merged-PR records from the GitHub API (with a git-history fallback),
//! classifying them into Keep a Changelog categories, and merging the
//! rendered entries back into the document idempotently.

pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod engine;
pub mod models;
pub mod render;
pub mod source;

/// Library-level error type for Logbook operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Untrusted or malformed remote URL: {0}")]
    UntrustedRemote(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Record source '{name}' failed: {reason}")]
    Source {
        name: &'static str,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Logbook operations.
pub type Result<T> = std::result::Result<T, Error>;
