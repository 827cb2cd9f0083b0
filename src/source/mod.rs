//! Record acquisition with an explicit fallback chain.
//!
//! Merged-change records come from one of two strategies, tried in order:
//!
//! 1. [`github::GithubSearchSource`] — the GitHub search API.
//! 2. [`git_log::GitLogSource`] — local merge-commit history.
//!
//! The chain commits to the first strategy that succeeds; results from two
//! strategies are never mixed. If every strategy fails, the chain yields
//! zero records — a normal outcome, not an error. Individual strategy
//! failures are logged and never surfaced to the caller.

pub mod git_log;
pub mod github;

use chrono::NaiveDate;

use crate::Result;
use crate::config::SyncConfig;
use crate::models::ChangeRecord;

/// One strategy for acquiring merged-change records.
///
/// `fetch` returns records newest-updated-first, at most `limit` of them.
/// An `Err` means "this strategy is unusable right now" and tells the
/// chain to move on; it is never shown to the end caller.
pub trait RecordSource {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Fetch up to `limit` merged-change records, newest first.
    fn fetch(&self, since: Option<NaiveDate>, limit: usize) -> Result<Vec<ChangeRecord>>;
}

/// An ordered list of strategies, tried front to back.
pub struct SourceChain {
    sources: Vec<Box<dyn RecordSource>>,
}

impl SourceChain {
    /// Build a chain from explicit strategies (used by tests).
    pub fn new(sources: Vec<Box<dyn RecordSource>>) -> Self {
        Self { sources }
    }

    /// Build the standard chain for a run: API first, git history second.
    /// Offline runs skip the network strategy entirely.
    pub fn for_config(config: &SyncConfig) -> Self {
        let mut sources: Vec<Box<dyn RecordSource>> = Vec::new();
        if !config.offline {
            sources.push(Box::new(github::GithubSearchSource::new(
                config.coords.value.clone(),
                config.token.clone(),
            )));
        }
        sources.push(Box::new(git_log::GitLogSource::new(
            config.repo_path.clone(),
            config.coords.value.clone(),
        )));
        Self { sources }
    }

    /// Fetch records from the first strategy that succeeds.
    ///
    /// Infallible by design: transient source failures degrade to the next
    /// strategy, and a fully failed chain degrades to zero records.
    pub fn fetch(&self, since: Option<NaiveDate>, limit: usize) -> Vec<ChangeRecord> {
        for source in &self.sources {
            match source.fetch(since, limit) {
                Ok(records) => {
                    tracing::debug!(
                        source = source.name(),
                        count = records.len(),
                        "fetched merged-change records"
                    );
                    return records;
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), "record source failed: {}", e);
                }
            }
        }
        Vec::new()
    }
}
