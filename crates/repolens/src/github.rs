//! GitHub REST API client: readme, branch head, recursive tree, paginated
//! commits, language stats, and arbitrary file contents.
//!
//! Retrieval degrades instead of failing: a transport error or missing
//! artifact yields `None` or an empty collection (logged), so one broken
//! fetch never aborts collection of the others. Content-bearing endpoints
//! decode inline base64 first, then follow the direct-download fallback,
//! and only then synthesize a descriptive not-found marker.

use crate::error::AgentError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Extract the `owner/name` slug from a repository URL.
///
/// Accepts full GitHub URLs (with or without extra path segments) and bare
/// `owner/name` slugs.
pub fn repo_slug(url: &str) -> Option<String> {
    let tail = url
        .split_once("github.com/")
        .map_or(url, |(_, tail)| tail);
    let parts: Vec<&str> = tail.split('/').filter(|p| !p.is_empty()).take(2).collect();
    match parts.as_slice() {
        [owner, name] => Some(format!("{owner}/{name}")),
        _ => None,
    }
}

/// One entry of a recursive repository tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    /// `blob` or `tree`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Read-only client for the GitHub REST v3 API.
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client, optionally authenticated with an API token.
    pub fn new(token: Option<String>) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .user_agent("repolens/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AgentError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: GITHUB_API_URL.to_string(),
            token,
        })
    }

    /// Point the client at a different API root (tests, GitHub Enterprise).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json(&self, url: &str) -> Result<Value, AgentError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let resp = request.send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AgentError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(AgentError::Transport(format!(
                "GitHub API HTTP {status} for {url}"
            )));
        }
        Ok(resp.json().await?)
    }

    /// Decoded README text, or `None` if the repository has none.
    pub async fn readme(&self, repo: &str) -> Option<String> {
        let url = format!("{}/repos/{repo}/readme", self.base_url);
        self.fetch_content(&url, "README.md").await
    }

    /// Decoded contents of one file, or `None` on failure.
    pub async fn file_contents(&self, repo: &str, path: &str) -> Option<String> {
        let url = format!("{}/repos/{repo}/contents/{path}", self.base_url);
        self.fetch_content(&url, path).await
    }

    async fn fetch_content(&self, url: &str, label: &str) -> Option<String> {
        let data = match self.get_json(url).await {
            Ok(data) => data,
            Err(err) => {
                warn!("fetch of {label} failed: {err}");
                return None;
            }
        };

        if let Some(encoded) = data.get("content").and_then(Value::as_str) {
            if let Some(text) = decode_base64_content(encoded) {
                return Some(text);
            }
            warn!("inline content of {label} was not valid base64");
        }

        if let Some(download_url) = data.get("download_url").and_then(Value::as_str) {
            debug!("following download_url for {label}");
            return self.download_raw(download_url, label).await;
        }

        Some(format!("[Error: No content found for {label}]"))
    }

    async fn download_raw(&self, url: &str, label: &str) -> Option<String> {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                warn!("raw download of {label} failed: {err}");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!("raw download of {label} failed: HTTP {}", resp.status());
            return None;
        }
        match resp.bytes().await {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                warn!("raw download of {label} failed: {err}");
                None
            }
        }
    }

    /// SHA of the default branch head. Tries `main`, then `master`.
    pub async fn branch_head(&self, repo: &str) -> Option<String> {
        for branch in ["main", "master"] {
            let url = format!("{}/repos/{repo}/branches/{branch}", self.base_url);
            match self.get_json(&url).await {
                Ok(data) => {
                    if let Some(sha) = data
                        .pointer("/commit/sha")
                        .and_then(Value::as_str)
                    {
                        return Some(sha.to_string());
                    }
                }
                Err(err) => debug!("branch {branch} unavailable: {err}"),
            }
        }
        warn!("no branch head found for {repo}");
        None
    }

    /// Recursive file tree at `sha`, normalized to an empty vec when the
    /// response is absent or malformed.
    pub async fn tree(&self, repo: &str, sha: &str) -> Vec<TreeEntry> {
        let url = format!("{}/repos/{repo}/git/trees/{sha}?recursive=1", self.base_url);
        match self.get_json(&url).await {
            Ok(data) => data
                .get("tree")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
            Err(err) => {
                warn!("tree fetch failed: {err}");
                Vec::new()
            }
        }
    }

    /// Commit history, paged forward until an empty page, an error, or the
    /// page cap. A page-level error truncates and returns what was
    /// collected so far.
    pub async fn commits(&self, repo: &str, page_size: usize, max_pages: usize) -> Vec<Value> {
        let mut all = Vec::new();
        for page in 1..=max_pages {
            let url = format!(
                "{}/repos/{repo}/commits?per_page={page_size}&page={page}",
                self.base_url
            );
            let batch = match self.get_json(&url).await {
                Ok(Value::Array(batch)) => batch,
                Ok(_) => {
                    warn!("commit page {page} had unexpected shape, stopping");
                    break;
                }
                Err(err) => {
                    warn!("commit pagination stopped at page {page}: {err}");
                    break;
                }
            };
            if batch.is_empty() {
                break;
            }
            all.extend(batch);
        }
        info!("fetched {} commits for {repo}", all.len());
        all
    }

    /// Language breakdown (bytes per language), normalized to an empty map.
    pub async fn languages(&self, repo: &str) -> BTreeMap<String, u64> {
        let url = format!("{}/repos/{repo}/languages", self.base_url);
        match self.get_json(&url).await {
            Ok(data) => serde_json::from_value(data).unwrap_or_default(),
            Err(err) => {
                warn!("languages fetch failed: {err}");
                BTreeMap::new()
            }
        }
    }
}

/// Decode GitHub's base64 content field, which embeds newlines.
fn decode_base64_content(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_full_url() {
        assert_eq!(
            repo_slug("https://github.com/rust-lang/rust").as_deref(),
            Some("rust-lang/rust")
        );
        assert_eq!(
            repo_slug("https://github.com/rust-lang/rust/tree/master/src").as_deref(),
            Some("rust-lang/rust")
        );
    }

    #[test]
    fn slug_from_bare_pair() {
        assert_eq!(repo_slug("rust-lang/rust").as_deref(), Some("rust-lang/rust"));
    }

    #[test]
    fn slug_rejects_incomplete_references() {
        assert_eq!(repo_slug("https://github.com/rust-lang"), None);
        assert_eq!(repo_slug("nonsense"), None);
        assert_eq!(repo_slug(""), None);
    }

    #[test]
    fn base64_decode_tolerates_embedded_newlines() {
        // "# Hello\nWorld\n" split the way the API returns it.
        let encoded = "IyBIZWxsbwpX\nb3JsZAo=\n";
        assert_eq!(
            decode_base64_content(encoded).as_deref(),
            Some("# Hello\nWorld\n")
        );
    }

    #[test]
    fn base64_decode_rejects_garbage() {
        assert!(decode_base64_content("not base64 at all!!!").is_none());
    }

    #[test]
    fn tree_entries_tolerate_extra_fields() {
        let raw = serde_json::json!([
            {"path": "src/main.rs", "type": "blob", "size": 120, "sha": "abc", "url": "u"},
            {"path": "src", "type": "tree"}
        ]);
        let entries: Vec<TreeEntry> = serde_json::from_value(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, "blob");
        assert_eq!(entries[1].size, None);
    }
}
