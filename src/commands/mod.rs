//! Command implementations for the Logbook CLI.
//!
//! This layer owns persistence: it reads the changelog, hands the text to
//! the engine, and writes the full replacement back. Writes are always
//! whole-file; a no-op leaves the file completely untouched.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::SyncConfig;
use crate::engine::{self, BulkMode, SyncOutcome};
use crate::models::ChangeRecord;
use crate::source::SourceChain;
use crate::source::github::GithubSearchSource;
use crate::{Error, Result};

/// Skeleton used when populate runs against a missing document.
const DOCUMENT_SEED: &str = "# Changelog\n\nAll notable changes to this project are documented in this file.\n";

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Whether this run changed the document (drives the exit code).
    fn updated(&self) -> bool;

    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Result of `lbk update`.
#[derive(Debug, Serialize)]
pub struct UpdateOutput {
    pub updated: bool,
    pub pr: u64,
    /// Category the entry was filed under; absent on a no-op.
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub changelog: String,
}

impl CommandResult for UpdateOutput {
    fn updated(&self) -> bool {
        self.updated
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        if self.updated {
            format!(
                "Recorded PR #{} under {} in {}",
                self.pr,
                self.category.as_deref().unwrap_or("?"),
                self.changelog
            )
        } else {
            format!("PR #{} already recorded in {}", self.pr, self.changelog)
        }
    }
}

/// Result of `lbk populate`.
#[derive(Debug, Serialize)]
pub struct PopulateOutput {
    pub updated: bool,
    /// Records the source chain produced.
    pub fetched: usize,
    /// Records newly written into the unreleased section.
    pub merged: usize,
    /// Records dropped as already present (or batch duplicates).
    pub skipped: usize,
    pub changelog: String,
}

impl CommandResult for PopulateOutput {
    fn updated(&self) -> bool {
        self.updated
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        if self.updated {
            format!(
                "Added {} of {} fetched PRs to {} ({} already recorded)",
                self.merged, self.fetched, self.changelog, self.skipped
            )
        } else {
            format!(
                "No new PRs to record in {} ({} fetched, {} already recorded)",
                self.changelog, self.fetched, self.skipped
            )
        }
    }
}

/// Record a single merged PR (merge-event mode).
///
/// The record arrives by parameter; the only fetch is an optional label
/// lookup, which degrades to no labels on any failure.
pub fn update(
    config: &SyncConfig,
    number: u64,
    title: String,
    body: String,
    author: Option<String>,
    url: Option<String>,
) -> Result<UpdateOutput> {
    let raw = read_document(&config.changelog_path)?.unwrap_or_default();

    let url = url.unwrap_or_else(|| config.coords.value.pull_url(number));
    let labels = if config.offline {
        Vec::new()
    } else {
        GithubSearchSource::new(config.coords.value.clone(), config.token.clone())
            .fetch_labels(number)
    };

    let record = ChangeRecord {
        id: number,
        title,
        body,
        labels,
        url,
    };

    let changelog = config.changelog_path.display().to_string();
    match engine::sync_single(&raw, &record) {
        SyncOutcome::NoOp { .. } => Ok(UpdateOutput {
            updated: false,
            pr: number,
            category: None,
            author,
            changelog,
        }),
        SyncOutcome::Updated { text, merged, .. } => {
            write_document(&config.changelog_path, &text)?;
            Ok(UpdateOutput {
                updated: true,
                pr: number,
                category: merged.first().map(|m| m.category.name().to_string()),
                author,
                changelog,
            })
        }
    }
}

/// Backfill the changelog from historical merged PRs (bulk mode).
pub fn populate(
    config: &SyncConfig,
    limit: usize,
    since: Option<chrono::NaiveDate>,
    merge: bool,
) -> Result<PopulateOutput> {
    if limit == 0 {
        return Err(Error::InvalidInput("--limit must be at least 1".to_string()));
    }

    let raw = read_document(&config.changelog_path)?
        .unwrap_or_else(|| DOCUMENT_SEED.to_string());

    let records = SourceChain::for_config(config).fetch(since, limit);
    let mode = if merge { BulkMode::Merge } else { BulkMode::Replace };

    let changelog = config.changelog_path.display().to_string();
    match engine::sync_bulk(&raw, &records, mode) {
        SyncOutcome::NoOp { skipped } => Ok(PopulateOutput {
            updated: false,
            fetched: records.len(),
            merged: 0,
            skipped,
            changelog,
        }),
        SyncOutcome::Updated {
            text,
            merged,
            skipped,
        } => {
            write_document(&config.changelog_path, &text)?;
            Ok(PopulateOutput {
                updated: true,
                fetched: records.len(),
                merged: merged.len(),
                skipped,
                changelog,
            })
        }
    }
}

/// Read the changelog, distinguishing "missing" from other IO failures.
fn read_document(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace the changelog wholesale. Never an in-place edit.
fn write_document(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RepoCoords, Resolved, ValueSource};
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> SyncConfig {
        SyncConfig {
            repo_path: dir.path().to_path_buf(),
            changelog_path: dir.path().join("CHANGELOG.md"),
            coords: Resolved::new(
                RepoCoords {
                    owner: "acme".to_string(),
                    name: "widget".to_string(),
                },
                ValueSource::CliFlag,
            ),
            token: None,
            offline: true,
        }
    }

    #[test]
    fn test_update_creates_document() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let output = update(
            &config,
            42,
            "feat: add cache eviction".to_string(),
            String::new(),
            None,
            None,
        )
        .unwrap();

        assert!(output.updated);
        assert_eq!(output.category.as_deref(), Some("Added"));

        let text = fs::read_to_string(&config.changelog_path).unwrap();
        assert!(text.contains("## [Unreleased]"));
        assert!(text.contains(
            "- add cache eviction ([#42](https://github.com/acme/widget/pull/42))"
        ));
    }

    #[test]
    fn test_update_is_noop_for_recorded_pr() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let doc = "## [Unreleased]\n\n### Fixed\n- old (#42)\n";
        fs::write(&config.changelog_path, doc).unwrap();

        let output = update(&config, 42, "fix: again".to_string(), String::new(), None, None)
            .unwrap();

        assert!(!output.updated);
        // Byte-unchanged on a no-op.
        assert_eq!(fs::read_to_string(&config.changelog_path).unwrap(), doc);
    }

    #[test]
    fn test_update_synthesizes_url_from_coords() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        update(&config, 7, "fix: pager".to_string(), String::new(), None, None).unwrap();

        let text = fs::read_to_string(&config.changelog_path).unwrap();
        assert!(text.contains("https://github.com/acme/widget/pull/7"));
    }

    #[test]
    fn test_populate_rejects_zero_limit() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        assert!(populate(&config, 0, None, false).is_err());
    }

    #[test]
    fn test_populate_empty_history_is_noop() {
        // No git repo and offline: the chain degrades to zero records.
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let output = populate(&config, 100, None, false).unwrap();
        assert!(!output.updated);
        assert_eq!(output.fetched, 0);
        // A no-op never creates the document either.
        assert!(!config.changelog_path.exists());
    }

    #[test]
    fn test_output_json_shape() {
        let output = UpdateOutput {
            updated: true,
            pr: 5,
            category: Some("Fixed".to_string()),
            author: None,
            changelog: "CHANGELOG.md".to_string(),
        };
        let json: serde_json::Value = serde_json::from_str(&output.to_json()).unwrap();
        assert_eq!(json["updated"], true);
        assert_eq!(json["pr"], 5);
        assert_eq!(json["category"], "Fixed");
    }
}
