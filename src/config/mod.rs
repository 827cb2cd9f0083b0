//! Run configuration, resolved once at startup and passed by parameter.
//!
//! Repository coordinates (owner/name) come from a two-tier fallback:
//!
//! 1. The `GITHUB_REPOSITORY` environment variable (`owner/name`), as set
//!    by CI.
//! 2. The local `remote.origin.url`, accepted only when it matches a
//!    strict allow-list of GitHub SSH/HTTPS shapes.
//!
//! Anything else degrades to the `unknown/unknown` placeholder: coordinate
//! resolution never fails a run on its own. The resolved value carries its
//! provenance so logs can say where it came from.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex_lite::Regex;

use crate::source::git_log::run_git;
use crate::{Error, Result};

/// Environment variable holding `owner/name` coordinates (set by CI).
pub const GITHUB_REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

/// Environment variable holding the API credential.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Timeout for the one-shot `git config` remote probe.
const REMOTE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks where a resolved configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from an environment variable.
    EnvVar(String),
    /// Value parsed from the local git remote URL.
    GitRemote,
    /// Value from a CLI flag.
    CliFlag,
    /// The `unknown/unknown` placeholder, used when nothing else resolved.
    Placeholder,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::GitRemote => write!(f, "git-remote"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value.
    pub value: T,
    /// Where the value came from.
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Repository coordinates: the `owner/name` pair URLs are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoords {
    pub owner: String,
    pub name: String,
}

impl RepoCoords {
    /// The placeholder used when coordinates cannot be determined.
    pub fn placeholder() -> Self {
        Self {
            owner: "unknown".to_string(),
            name: "unknown".to_string(),
        }
    }

    /// Canonical web URL for a pull request in this repository.
    pub fn pull_url(&self, id: u64) -> String {
        format!("https://github.com/{}/{}/pull/{}", self.owner, self.name, id)
    }
}

impl std::fmt::Display for RepoCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything one synchronization run needs, resolved up front.
///
/// There is no lazily-initialized global state: `main` builds this once
/// and every component receives it by parameter.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Repository working directory (git commands run here).
    pub repo_path: PathBuf,
    /// Absolute path of the changelog document.
    pub changelog_path: PathBuf,
    /// Repository coordinates with their provenance.
    pub coords: Resolved<RepoCoords>,
    /// Optional API credential; anonymous access is fine for public repos.
    pub token: Option<String>,
    /// Skip network strategies entirely (git-history fallback only).
    pub offline: bool,
}

impl SyncConfig {
    /// Assemble a run configuration.
    ///
    /// `changelog` is taken relative to `repo_path` unless absolute.
    pub fn resolve(
        repo_path: PathBuf,
        changelog: &Path,
        token: Option<String>,
        offline: bool,
    ) -> SyncConfig {
        let changelog_path = if changelog.is_absolute() {
            changelog.to_path_buf()
        } else {
            repo_path.join(changelog)
        };

        let coords = resolve_coords(&repo_path);
        tracing::debug!(
            coords = %coords.value,
            source = %coords.source,
            "resolved repository coordinates"
        );

        SyncConfig {
            repo_path,
            changelog_path,
            coords,
            token,
            offline,
        }
    }
}

/// Resolve repository coordinates: environment first, git remote second,
/// placeholder last. Never fails.
pub fn resolve_coords(repo_path: &Path) -> Resolved<RepoCoords> {
    if let Ok(slug) = std::env::var(GITHUB_REPOSITORY_ENV) {
        if let Some((owner, name)) = slug.split_once('/') {
            if !owner.is_empty() && !name.is_empty() {
                return Resolved::new(
                    RepoCoords {
                        owner: owner.to_string(),
                        name: name.to_string(),
                    },
                    ValueSource::EnvVar(GITHUB_REPOSITORY_ENV.to_string()),
                );
            }
        }
    }

    match coords_from_remote(repo_path) {
        Ok(coords) => Resolved::new(coords, ValueSource::GitRemote),
        Err(e) => {
            tracing::warn!("could not resolve coordinates from git remote: {}", e);
            Resolved::new(RepoCoords::placeholder(), ValueSource::Placeholder)
        }
    }
}

/// Read and parse `remote.origin.url`, rejecting unrecognized shapes.
fn coords_from_remote(repo_path: &Path) -> Result<RepoCoords> {
    let url = run_git(
        repo_path,
        &["config", "--get", "remote.origin.url"],
        REMOTE_PROBE_TIMEOUT,
    )?;
    parse_remote_url(url.trim())
}

/// Parse a GitHub remote URL into coordinates.
///
/// Only two shapes are accepted: `git@github.com:owner/name[.git]` and
/// `https://github.com/owner/name[.git][/]`. Everything else is rejected
/// rather than guessed at.
pub fn parse_remote_url(url: &str) -> Result<RepoCoords> {
    let ssh = Regex::new(r"^git@github\.com:([^/]+)/(.+?)(?:\.git)?$")
        .unwrap_or_else(|e| unreachable!("invalid ssh pattern: {e}"));
    let https = Regex::new(r"^https://github\.com/([^/]+)/(.+?)(?:\.git)?/?$")
        .unwrap_or_else(|e| unreachable!("invalid https pattern: {e}"));

    let caps = ssh
        .captures(url)
        .or_else(|| https.captures(url))
        .ok_or_else(|| Error::UntrustedRemote(url.to_string()))?;

    let owner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let name = caps
        .get(2)
        .map(|m| m.as_str().trim_end_matches('/'))
        .unwrap_or_default();
    if owner.is_empty() || name.is_empty() {
        return Err(Error::UntrustedRemote(url.to_string()));
    }

    Ok(RepoCoords {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

/// Walk up from `start` looking for a `.git` directory.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssh_remote() {
        let coords = parse_remote_url("git@github.com:acme/widget.git").unwrap();
        assert_eq!(coords.owner, "acme");
        assert_eq!(coords.name, "widget");
    }

    #[test]
    fn test_parse_ssh_remote_without_suffix() {
        let coords = parse_remote_url("git@github.com:acme/widget").unwrap();
        assert_eq!(coords.name, "widget");
    }

    #[test]
    fn test_parse_https_remote() {
        let coords = parse_remote_url("https://github.com/acme/widget.git").unwrap();
        assert_eq!(coords.owner, "acme");
        assert_eq!(coords.name, "widget");
    }

    #[test]
    fn test_parse_https_remote_trailing_slash() {
        let coords = parse_remote_url("https://github.com/acme/widget/").unwrap();
        assert_eq!(coords.name, "widget");
    }

    #[test]
    fn test_reject_other_hosts() {
        assert!(parse_remote_url("https://gitlab.com/acme/widget.git").is_err());
        assert!(parse_remote_url("git@bitbucket.org:acme/widget.git").is_err());
    }

    #[test]
    fn test_reject_garbage() {
        assert!(parse_remote_url("").is_err());
        assert!(parse_remote_url("not a url at all").is_err());
        assert!(parse_remote_url("https://github.com/").is_err());
    }

    #[test]
    fn test_placeholder_pull_url() {
        let coords = RepoCoords::placeholder();
        assert_eq!(coords.pull_url(7), "https://github.com/unknown/unknown/pull/7");
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(
            ValueSource::EnvVar("GITHUB_REPOSITORY".to_string()).to_string(),
            "env:GITHUB_REPOSITORY"
        );
        assert_eq!(ValueSource::Placeholder.to_string(), "placeholder");
    }
}
