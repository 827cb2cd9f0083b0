//! Logbook CLI - keeps CHANGELOG.md in sync with merged pull requests.

use std::env;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use logbook::cli::{Cli, Commands};
use logbook::commands::{self, CommandResult};
use logbook::config::{SyncConfig, find_git_root};

/// Exit code signaling "nothing to do" so automation can skip its commit
/// step. 0 means the document was updated; 1 means a hard failure.
const EXIT_NOOP: i32 = 3;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let human = cli.human_readable;

    // Determine repo path: --repo flag > LBK_REPO env > git root > cwd
    let repo_path = resolve_repo_path(cli.repo_path, human);
    let config = SyncConfig::resolve(repo_path, &cli.changelog, cli.token, cli.offline);

    let result: logbook::Result<Box<dyn CommandResult>> = match cli.command {
        Commands::Update {
            number,
            title,
            body,
            author,
            url,
        } => commands::update(&config, number, title, body, author, url)
            .map(|o| Box::new(o) as Box<dyn CommandResult>),
        Commands::Populate {
            limit,
            since,
            merge,
        } => commands::populate(&config, limit, since, merge)
            .map(|o| Box::new(o) as Box<dyn CommandResult>),
    };

    match result {
        Ok(output) => {
            if human {
                println!("{}", output.to_human());
            } else {
                println!("{}", output.to_json());
            }
            if !output.updated() {
                process::exit(EXIT_NOOP);
            }
        }
        Err(e) => {
            if human {
                eprintln!("Error: {}", e);
            } else {
                eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            process::exit(1);
        }
    }
}

/// Resolve the repository path from the explicit flag, the environment,
/// or git root auto-detection.
///
/// An explicit path is used literally (it must exist); otherwise the git
/// root above the current directory wins, falling back to the current
/// directory itself.
fn resolve_repo_path(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                let message = format!("Specified repo path does not exist: {}", path.display());
                if human {
                    eprintln!("Error: {}", message);
                } else {
                    eprintln!("{}", serde_json::json!({ "error": message }));
                }
                process::exit(1);
            }
            path
        }
        None => {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            find_git_root(&cwd).unwrap_or(cwd)
        }
    }
}
