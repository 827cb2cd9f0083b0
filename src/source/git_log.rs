//! Fallback record source: local git merge history.
//!
//! Scans `git log --merges` subjects for `#<digits>` references and
//! synthesizes change records from them. Records built this way have no
//! body and no labels, and their URLs come from the resolved repository
//! coordinates (possibly the `unknown/unknown` placeholder).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use regex_lite::Regex;
use wait_timeout::ChildExt;

use crate::config::RepoCoords;
use crate::models::ChangeRecord;
use crate::source::RecordSource;
use crate::{Error, Result};

/// Timeout for the git log subprocess.
const GIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Record source backed by merge commits in the local repository.
pub struct GitLogSource {
    repo_path: PathBuf,
    coords: RepoCoords,
}

impl GitLogSource {
    /// Create a git-history source rooted at `repo_path`.
    pub fn new(repo_path: PathBuf, coords: RepoCoords) -> Self {
        Self { repo_path, coords }
    }
}

impl RecordSource for GitLogSource {
    fn name(&self) -> &'static str {
        "git-log"
    }

    /// Scan merge-commit subjects for PR references.
    ///
    /// `since` is not honored here: merge-commit dates do not reliably
    /// track merge dates across rebases, so this source returns the most
    /// recent `limit` merges regardless.
    fn fetch(&self, _since: Option<NaiveDate>, limit: usize) -> Result<Vec<ChangeRecord>> {
        let output = run_git(
            &self.repo_path,
            &[
                "log",
                "--all",
                "--oneline",
                "--merges",
                "-n",
                &limit.to_string(),
            ],
            GIT_TIMEOUT,
        )?;

        let id_pattern = Regex::new(r"#(\d+)")
            .unwrap_or_else(|e| unreachable!("invalid id pattern: {e}"));
        // "Merge pull request #123 from owner/branch <subject>"
        let subject_pattern = Regex::new(r"#\d+\s+from\s+\S+\s+(.+)")
            .unwrap_or_else(|e| unreachable!("invalid subject pattern: {e}"));

        let mut records = Vec::new();
        for line in output.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let Some(id) = id_pattern
                .captures(line)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u64>().ok())
            else {
                continue;
            };

            // Prefer the subject after the branch name; merge subjects
            // rarely carry one, so the whole line is the usual outcome.
            let title = subject_pattern
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| line.to_string());

            records.push(ChangeRecord {
                id,
                title,
                body: String::new(),
                labels: Vec::new(),
                url: self.coords.pull_url(id),
            });
            if records.len() == limit {
                break;
            }
        }

        Ok(records)
    }
}

/// Run a git subcommand with a hard timeout, returning its stdout.
///
/// Both pipes are drained on background threads while the parent waits:
/// a child blocked writing into a full pipe would otherwise hang until
/// the timeout kills it. A child that outlives the timeout is killed and
/// reported as a failure; there is no retry. Callers treat any error as
/// "this strategy is unavailable".
pub(crate) fn run_git(repo_path: &Path, args: &[&str], timeout: Duration) -> Result<String> {
    let mut child = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Other(format!("Failed to run git: {}", e)))?;

    let stdout_reader = child.stdout.take().map(drain_pipe);
    let stderr_reader = child.stderr.take().map(drain_pipe);

    let status = child
        .wait_timeout(timeout)
        .map_err(|e| Error::Other(format!("Failed to wait for git: {}", e)))?;

    let Some(status) = status else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(Error::Other(format!(
            "git {} timed out after {}s",
            args.first().unwrap_or(&""),
            timeout.as_secs()
        )));
    };

    let stdout = join_pipe(stdout_reader);

    if !status.success() {
        let stderr = join_pipe(stderr_reader);
        return Err(Error::Other(format!(
            "git {} failed: {}",
            args.first().unwrap_or(&""),
            stderr.trim()
        )));
    }

    Ok(stdout)
}

/// Read a child pipe to the end on a background thread.
fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = pipe.read_to_string(&mut buf);
        buf
    })
}

/// Collect a drained pipe's contents once the child has exited.
fn join_pipe(reader: Option<thread::JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
