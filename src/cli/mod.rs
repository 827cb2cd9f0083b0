//! CLI argument definitions for Logbook.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Logbook - keep a changelog in sync with merged pull requests.
///
/// Run `lbk update` from a merge-event workflow, or `lbk populate` to
/// backfill from history.
#[derive(Parser, Debug)]
#[command(name = "lbk")]
#[command(author, version, about = "Keep CHANGELOG.md in sync with merged pull requests", long_about = None)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (", env!("LBK_GIT_COMMIT"), ", built ", env!("LBK_BUILD_TIMESTAMP"), ")"
))]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if lbk was started in <path> instead of the current directory.
    /// Can also be set via the LBK_REPO environment variable.
    #[arg(short = 'C', long = "repo", global = true, env = "LBK_REPO")]
    pub repo_path: Option<PathBuf>,

    /// Changelog path, taken relative to the repository root
    #[arg(
        long = "changelog",
        global = true,
        env = "LBK_CHANGELOG",
        default_value = ".github/CHANGELOG.md"
    )]
    pub changelog: PathBuf,

    /// GitHub API token (optional; anonymous access works for public repos)
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Skip the GitHub API entirely and use only local git history
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record one merged PR in the changelog (merge-event mode)
    ///
    /// Exits 0 when the changelog changed and 3 when the PR was already
    /// recorded, so calling automation can skip its commit step.
    Update {
        /// PR number
        #[arg(long, env = "PR_NUMBER")]
        number: u64,

        /// PR title
        #[arg(long, env = "PR_TITLE", default_value = "")]
        title: String,

        /// PR body
        #[arg(long, env = "PR_BODY", default_value = "")]
        body: String,

        /// PR author login (recorded in the result payload only)
        #[arg(long, env = "PR_AUTHOR")]
        author: Option<String>,

        /// Canonical PR URL; synthesized from repository coordinates when omitted
        #[arg(long, env = "PR_URL")]
        url: Option<String>,
    },

    /// Backfill the changelog from historical merged PRs (bulk mode)
    ///
    /// By default the unreleased section is rebuilt from the fetched set;
    /// pass --merge to keep entries the fetch did not cover.
    Populate {
        /// Maximum number of PRs to fetch
        #[arg(long, default_value_t = 100)]
        limit: usize,

        /// Only fetch PRs merged on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_since)]
        since: Option<NaiveDate>,

        /// Merge fetched entries into the existing unreleased section
        /// instead of replacing it
        #[arg(long)]
        merge: bool,
    },
}

/// Validate a `--since` date before anything else runs.
pub fn parse_since(raw: &str) -> Result<NaiveDate, crate::Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| crate::Error::InvalidDate(raw.to_string()))
}
