//! Common test utilities for logbook integration tests.
//!
//! Provides `TestEnv` for isolated test environments: each one is a fresh
//! temporary directory (optionally a real git repository with synthetic
//! PR merge commits) that the `lbk` binary is pointed at via `-C`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with an isolated repository directory.
pub struct TestEnv {
    pub repo_dir: TempDir,
}

impl TestEnv {
    /// Create a plain (non-git) environment.
    pub fn new() -> Self {
        Self {
            repo_dir: TempDir::new().unwrap(),
        }
    }

    /// Create an environment backed by a real git repository.
    pub fn with_git() -> Self {
        let env = Self::new();
        env.git(&["init", "-b", "main"]);
        env.git(&["config", "user.email", "test@test.com"]);
        env.git(&["config", "user.name", "Test"]);
        env.git(&["commit", "--allow-empty", "-m", "initial commit"]);
        env
    }

    /// Run a git command inside the repository, asserting success.
    pub fn git(&self, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(self.repo_dir.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Create a merge commit shaped like a GitHub PR merge.
    pub fn merge_pr(&self, number: u64, branch: &str) {
        self.git(&["checkout", "-b", branch]);
        self.git(&["commit", "--allow-empty", "-m", &format!("work on {}", branch)]);
        self.git(&["checkout", "main"]);
        self.git(&[
            "merge",
            "--no-ff",
            branch,
            "-m",
            &format!("Merge pull request #{} from acme/{}", number, branch),
        ]);
    }

    /// Get a Command for the lbk binary, pinned to this environment.
    ///
    /// Runs offline with fixed `acme/widget` coordinates so tests never
    /// touch the network and never inherit CI credentials.
    pub fn lbk(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lbk"));
        cmd.current_dir(self.repo_dir.path());
        cmd.arg("-C").arg(self.repo_dir.path());
        cmd.arg("--offline");
        cmd.env("GITHUB_REPOSITORY", "acme/widget");
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("LBK_CHANGELOG");
        cmd.env_remove("LBK_REPO");
        cmd
    }

    /// Same as [`lbk`](TestEnv::lbk), but without the fixed coordinates.
    pub fn lbk_without_coords(&self) -> Command {
        let mut cmd = self.lbk();
        cmd.env_remove("GITHUB_REPOSITORY");
        cmd
    }

    /// Path of the default changelog document.
    pub fn changelog_path(&self) -> PathBuf {
        self.repo_dir.path().join(".github/CHANGELOG.md")
    }

    /// Read the changelog, panicking if it does not exist.
    pub fn read_changelog(&self) -> String {
        std::fs::read_to_string(self.changelog_path()).expect("changelog missing")
    }

    /// Seed the changelog with the given content.
    pub fn write_changelog(&self, content: &str) {
        std::fs::create_dir_all(self.changelog_path().parent().unwrap()).unwrap();
        std::fs::write(self.changelog_path(), content).unwrap();
    }

    /// Path of the repository directory.
    pub fn path(&self) -> &Path {
        self.repo_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Exit code the binary uses for "nothing to do".
pub const EXIT_NOOP: i32 = 3;
