//! The request-scoped facade: wires the fetcher, budgeter, dispatcher, and
//! gateway together behind the four logical operations (observe, fetch a
//! file, act, chat).
//!
//! One `Agent` is built per process from an [`AgentConfig`] and shared
//! immutably across requests; each call runs start to finish with no
//! concurrent sub-tasks and no state carried between requests.

use crate::config::AgentConfig;
use crate::context::condenser;
use crate::error::AgentError;
use crate::github::{repo_slug, GithubClient, TreeEntry};
use crate::model::{CompletionClient, InferenceClient};
use crate::prompt::ConversationTurn;
use crate::tasks::{Task, TaskDispatcher};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// Everything one observation pass collects about a repository. Artifacts
/// that could not be retrieved are `None`/empty rather than errors.
#[derive(Debug, Serialize)]
pub struct Observation {
    pub repo_name: String,
    pub readme: Option<String>,
    pub file_tree: Option<Vec<TreeEntry>>,
    pub commits: Vec<Value>,
    pub languages: BTreeMap<String, u64>,
    pub package_json: Option<String>,
    pub requirements_txt: Option<String>,
}

/// The agent, generic over its oracle so tests can substitute a mock.
pub struct Agent<C: CompletionClient> {
    config: AgentConfig,
    github: GithubClient,
    oracle: C,
}

impl Agent<InferenceClient> {
    /// Build a production agent: GitHub client plus HTTP inference client.
    pub fn from_config(config: AgentConfig) -> Result<Self, AgentError> {
        let github = GithubClient::new(config.github_token.clone())?;
        let oracle = InferenceClient::new(&config)?;
        Ok(Self::new(config, github, oracle))
    }
}

impl<C: CompletionClient> Agent<C> {
    pub fn new(config: AgentConfig, github: GithubClient, oracle: C) -> Self {
        Self {
            config,
            github,
            oracle,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Collect README, file tree, commit history, languages, and the two
    /// manifest files. Fetches run one at a time; a failed fetch leaves its
    /// field absent and never aborts the others.
    pub async fn observe(&self, repo_url: &str) -> Result<Observation, AgentError> {
        let repo = repo_slug(repo_url).ok_or_else(|| {
            AgentError::Validation(format!("not a repository reference: {repo_url}"))
        })?;
        info!("observing {repo}");

        let readme = self.github.readme(&repo).await;
        let file_tree = match self.github.branch_head(&repo).await {
            Some(sha) => Some(self.github.tree(&repo, &sha).await),
            None => None,
        };
        let limits = &self.config.limits;
        let commits = self
            .github
            .commits(&repo, limits.commit_page_size, limits.max_commit_pages)
            .await;
        let languages = self.github.languages(&repo).await;
        let package_json = self.github.file_contents(&repo, "package.json").await;
        let requirements_txt = self.github.file_contents(&repo, "requirements.txt").await;

        info!("observation of {repo} complete");
        Ok(Observation {
            repo_name: repo,
            readme,
            file_tree,
            commits,
            languages,
            package_json,
            requirements_txt,
        })
    }

    /// Decoded contents of one file, or `None`/marker as the fetcher saw it.
    pub async fn file_contents(&self, repo: &str, path: &str) -> Option<String> {
        self.github.file_contents(repo, path).await
    }

    /// Run one named task over caller-supplied data.
    pub async fn act(&self, task_name: &str, data: &Value) -> Result<String, AgentError> {
        let task = Task::parse(task_name, data)?;
        TaskDispatcher::new(&self.oracle, &self.config.limits)
            .run(task)
            .await
    }

    /// Answer a question grounded in the README and prior turns.
    pub async fn chat(
        &self,
        readme: Option<&str>,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<String, AgentError> {
        condenser::chat(
            &self.oracle,
            &self.config.limits,
            readme,
            history,
            question,
        )
        .await
    }
}
