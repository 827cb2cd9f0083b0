//! Primary record source: the GitHub search API.
//!
//! Queries `/search/issues` for merged PRs in the configured repository.
//! Authentication is optional: without a token the request goes out
//! anonymously, which is fine for public repositories. Every failure mode
//! here (transport, non-2xx, malformed payload) is an `Err` that the
//! source chain converts into a fallback, never a caller-visible error.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::RepoCoords;
use crate::models::ChangeRecord;
use crate::source::RecordSource;
use crate::{Error, Result};

/// GitHub API base URL.
const GITHUB_API_BASE: &str = "https://api.github.com";

/// User-Agent header required by the GitHub API.
const USER_AGENT: &str = "logbook-cli";

/// Timeout for each API request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Search response envelope (only the fields we care about).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

/// One merged PR as returned by the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchItem {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
struct Label {
    name: String,
}

/// Record source backed by the GitHub search API.
pub struct GithubSearchSource {
    coords: RepoCoords,
    token: Option<String>,
    agent: ureq::Agent,
}

impl GithubSearchSource {
    /// Create an API source for the given repository coordinates.
    pub fn new(coords: RepoCoords, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(HTTP_TIMEOUT)
            .build();
        Self {
            coords,
            token,
            agent,
        }
    }

    /// Build a request with the standard GitHub headers.
    ///
    /// The bearer token is attached only when one is configured; anonymous
    /// access degrades silently rather than erroring.
    fn request(&self, url: &str) -> ureq::Request {
        let mut request = self
            .agent
            .get(url)
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", USER_AGENT)
            .set("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }
        request
    }

    /// Fetch the lowercased label names for a single PR.
    ///
    /// Used by single-record mode, where the merge event payload carries
    /// no labels. Any failure degrades to an empty label set.
    pub fn fetch_labels(&self, id: u64) -> Vec<String> {
        #[derive(Debug, Deserialize)]
        struct PullResponse {
            #[serde(default)]
            labels: Vec<Label>,
        }

        let url = format!(
            "{}/repos/{}/{}/pulls/{}",
            GITHUB_API_BASE, self.coords.owner, self.coords.name, id
        );

        let labels = self
            .request(&url)
            .call()
            .map_err(|e| Error::Http(e.to_string()))
            .and_then(|resp| {
                resp.into_json::<PullResponse>()
                    .map_err(|e| Error::Http(e.to_string()))
            });

        match labels {
            Ok(pull) => pull
                .labels
                .into_iter()
                .map(|l| l.name.to_lowercase())
                .collect(),
            Err(e) => {
                tracing::debug!(pr = id, "could not fetch PR labels: {}", e);
                Vec::new()
            }
        }
    }
}

impl RecordSource for GithubSearchSource {
    fn name(&self) -> &'static str {
        "github-search"
    }

    fn fetch(&self, since: Option<NaiveDate>, limit: usize) -> Result<Vec<ChangeRecord>> {
        let mut query = format!("repo:{} is:pr is:merged", self.coords);
        if let Some(date) = since {
            query.push_str(&format!(" merged:>={}", date.format("%Y-%m-%d")));
        }

        let url = format!("{}/search/issues", GITHUB_API_BASE);
        let response = self
            .request(&url)
            .query("q", &query)
            .query("sort", "updated")
            .query("order", "desc")
            .query("per_page", &limit.min(100).to_string())
            .call()
            .map_err(|e| Error::Http(e.to_string()))?;

        let parsed: SearchResponse = response
            .into_json()
            .map_err(|e| Error::Http(format!("malformed search payload: {}", e)))?;

        let mut records: Vec<ChangeRecord> = parsed
            .items
            .into_iter()
            .map(|item| ChangeRecord {
                id: item.number,
                title: item.title,
                body: item.body.unwrap_or_default(),
                labels: item
                    .labels
                    .into_iter()
                    .map(|l| l.name.to_lowercase())
                    .collect(),
                url: item.html_url,
            })
            .collect();
        records.truncate(limit);
        Ok(records)
    }
}
