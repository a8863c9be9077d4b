//! Task dispatch: maps a symbolic task name to one fixed prompt recipe.
//!
//! The task set is closed. Each variant carries its own strongly-typed
//! fields, validated and normalized from the caller's loosely-structured
//! payload at the boundary: heterogeneous commit shapes degrade to empty
//! derivations instead of failing, and an empty derivation short-circuits
//! with a descriptive result before any oracle call.

use crate::config::Limits;
use crate::context::{take_chars, Budgeter};
use crate::error::AgentError;
use crate::model::CompletionClient;
use crate::prompt::{context_block, PromptTemplate, Role};
use serde_json::Value;
use tracing::info;

// Literal task names accepted from clients.
pub const TASK_SUMMARIZE_PURPOSE: &str = "Summarize Repo Purpose";
pub const TASK_IDENTIFY_STACK: &str = "Identify Tech Stack & Dependencies";
pub const TASK_ACTIVITY_TRENDS: &str = "Analyze Activity Trends";
pub const TASK_KEY_CONTRIBUTORS: &str = "Find Key Contributors";
pub const TASK_EXPLAIN_FILE: &str = "Explain File";

const EXPLAIN_FILE_SYSTEM_PROMPT: &str = "\
You are an expert software engineer. Use the README only as context for the project's \
purpose, and focus on explaining the provided file's code logic and role within the \
project. Avoid restating README information.";

/// One executable task with its validated inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    SummarizePurpose {
        readme: String,
    },
    IdentifyStack {
        languages: Value,
        package_json: String,
        requirements_txt: String,
    },
    ActivityTrends {
        commit_dates: Vec<String>,
    },
    KeyContributors {
        authors: Vec<String>,
    },
    ExplainFile {
        readme_context: String,
        file_content: String,
    },
}

impl Task {
    /// Validate a symbolic task name and its payload into a typed task.
    ///
    /// Unknown names yield a [`AgentError::Validation`] carrying the literal
    /// name; the oracle is never consulted for them.
    pub fn parse(name: &str, data: &Value) -> Result<Self, AgentError> {
        match name {
            TASK_SUMMARIZE_PURPOSE => Ok(Task::SummarizePurpose {
                readme: match data.as_str() {
                    Some(text) => text.to_string(),
                    None => data.to_string(),
                },
            }),
            TASK_IDENTIFY_STACK => Ok(Task::IdentifyStack {
                languages: data.get("languages").cloned().unwrap_or_else(|| Value::Object(Default::default())),
                package_json: stringify_field(data.get("package_json")),
                requirements_txt: stringify_field(data.get("requirements_txt")),
            }),
            TASK_ACTIVITY_TRENDS => Ok(Task::ActivityTrends {
                commit_dates: extract_commit_dates(data.get("commits").unwrap_or(&Value::Null)),
            }),
            TASK_KEY_CONTRIBUTORS => Ok(Task::KeyContributors {
                authors: extract_authors(data.get("commits").unwrap_or(&Value::Null)),
            }),
            TASK_EXPLAIN_FILE => Ok(Task::ExplainFile {
                readme_context: data
                    .get("readme_content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                file_content: data
                    .get("file_content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            }),
            other => Err(AgentError::Validation(format!(
                "Unknown action task: {other}"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::SummarizePurpose { .. } => TASK_SUMMARIZE_PURPOSE,
            Task::IdentifyStack { .. } => TASK_IDENTIFY_STACK,
            Task::ActivityTrends { .. } => TASK_ACTIVITY_TRENDS,
            Task::KeyContributors { .. } => TASK_KEY_CONTRIBUTORS,
            Task::ExplainFile { .. } => TASK_EXPLAIN_FILE,
        }
    }
}

/// Normalize a manifest field to text: strings pass through, other shapes
/// are serialized, absent/null becomes empty.
fn stringify_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Treat a commits payload as a list: arrays pass through, a lone object is
/// wrapped, anything else is empty.
fn commit_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

fn extract_commit_dates(commits: &Value) -> Vec<String> {
    commit_list(commits)
        .into_iter()
        .filter(|c| c.is_object())
        .map(|c| {
            c.pointer("/commit/author/date")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string()
        })
        .collect()
}

fn extract_authors(commits: &Value) -> Vec<String> {
    commit_list(commits)
        .into_iter()
        .filter(|c| c.is_object())
        .map(|c| {
            c.pointer("/author/login")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string()
        })
        .collect()
}

// ── Dispatcher ─────────────────────────────────────────────────────

/// Runs one task: per-field budgeting, prompt assembly, one generation call.
pub struct TaskDispatcher<'a> {
    oracle: &'a dyn CompletionClient,
    limits: &'a Limits,
}

impl<'a> TaskDispatcher<'a> {
    pub fn new(oracle: &'a dyn CompletionClient, limits: &'a Limits) -> Self {
        Self { oracle, limits }
    }

    /// Execute the task and return its result text.
    ///
    /// No-data short circuits return descriptive text without an oracle
    /// call; everything else ends in exactly one generation call.
    pub async fn run(&self, task: Task) -> Result<String, AgentError> {
        info!("dispatching task: {}", task.name());
        let budgeter = Budgeter::new(self.oracle);

        let prompt = match task {
            Task::SummarizePurpose { readme } => {
                let readme = budgeter
                    .fit(&readme, "README.md", self.limits.field_input)
                    .await;
                PromptTemplate::new()
                    .turn(
                        Role::User,
                        format!(
                            "Please provide a concise, one-paragraph summary of this \
                             project's README:\n---\n{readme}\n---"
                        ),
                    )
                    .render()
            }

            Task::IdentifyStack {
                languages,
                package_json,
                requirements_txt,
            } => {
                let package_json = budgeter
                    .fit(&package_json, "package.json", self.limits.field_input)
                    .await;
                let requirements_txt = budgeter
                    .fit(&requirements_txt, "requirements.txt", self.limits.field_input)
                    .await;
                PromptTemplate::new()
                    .turn(
                        Role::User,
                        format!(
                            "Identify this project's primary technologies and dependencies.\n\
                             - Languages: {languages}\n\
                             - package.json: {package_json}\n\
                             - requirements.txt: {requirements_txt}\n\
                             Return a bullet list of major frameworks and libraries."
                        ),
                    )
                    .render()
            }

            Task::ActivityTrends { commit_dates } => {
                if commit_dates.is_empty() {
                    return Ok("No commit data found; unable to analyze activity.".to_string());
                }
                let dates: Vec<&str> = commit_dates
                    .iter()
                    .take(self.limits.trend_date_cap)
                    .map(String::as_str)
                    .collect();
                PromptTemplate::new()
                    .turn(
                        Role::User,
                        format!(
                            "Based on these commit timestamps, describe whether this \
                             repository is very active, moderately active, or stale. \
                             Provide a single, concise assessment.\nCommit Dates:\n{}",
                            dates.join(", ")
                        ),
                    )
                    .render()
            }

            Task::KeyContributors { authors } => {
                if authors.is_empty() {
                    return Ok("No contributor data available in commit history.".to_string());
                }
                let authors: Vec<&str> = authors
                    .iter()
                    .take(self.limits.contributor_cap)
                    .map(String::as_str)
                    .collect();
                PromptTemplate::new()
                    .turn(
                        Role::User,
                        format!(
                            "From this list of commit authors, identify the top 3-5 most \
                             frequent contributors, count their commits, and summarize \
                             their roles if identifiable.\nAuthors:\n{}",
                            authors.join(", ")
                        ),
                    )
                    .render()
            }

            Task::ExplainFile {
                readme_context,
                file_content,
            } => {
                if file_content.is_empty() {
                    return Err(AgentError::Validation(
                        "No file content available for explanation.".to_string(),
                    ));
                }
                let readme_context = budgeter
                    .fit(&readme_context, "README context", self.limits.field_input)
                    .await;
                PromptTemplate::new()
                    .system(EXPLAIN_FILE_SYSTEM_PROMPT)
                    .turn(
                        Role::User,
                        format!(
                            "{}\n\n{}\n\nExplain clearly:\n\
                             - What this file does and how it fits into the repo\n\
                             - Its main functions or classes\n\
                             - Any dependencies or integrations",
                            context_block(
                                "README_CONTEXT",
                                take_chars(&readme_context, self.limits.explain_readme_slice),
                            ),
                            context_block(
                                "FILE_CONTENT",
                                take_chars(&file_content, self.limits.explain_file_slice),
                            ),
                        ),
                    )
                    .render()
            }
        };

        self.oracle.complete(&prompt).await
    }
}
