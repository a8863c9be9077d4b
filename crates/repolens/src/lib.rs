//! Observe a public GitHub repository, act on the collected data through a
//! language model, and chat about the repository's documentation.
//!
//! The interesting part is the context-budget pipeline: every model
//! invocation first checks its input against a character budget and, when
//! the input is oversized, condenses it through a single summarization call
//! before proceeding: per-field for raw artifacts, whole-prompt for chat.
//! Everything else (GitHub retrieval, prompt rendering, task dispatch) is
//! plumbing around that pipeline.
//!
//! # Getting started
//!
//! ```ignore
//! use repolens::{Agent, AgentConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), repolens::AgentError> {
//!     let config = AgentConfig::from_env()?;
//!     let agent = Agent::from_config(config)?;
//!
//!     let observation = agent.observe("https://github.com/rust-lang/rust").await?;
//!     let summary = agent
//!         .act(
//!             repolens::tasks::TASK_SUMMARIZE_PURPOSE,
//!             &serde_json::json!(observation.readme),
//!         )
//!         .await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`agent`] | [`Agent`] facade exposing observe / file / act / chat |
//! | [`github`] | GitHub REST fetcher with pagination and content decoding |
//! | [`prompt`] | Role-delimited prompt templates and history rendering |
//! | [`context`] | Character budgets, summarize-or-truncate, chat condensation |
//! | [`tasks`] | Closed task set and the dispatcher |
//! | [`model`] | [`CompletionClient`](model::CompletionClient) seam and the HTTP inference client |
//! | [`config`] | [`AgentConfig`] and the consolidated [`Limits`](config::Limits) table |
//! | [`error`] | [`AgentError`] taxonomy |

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod github;
pub mod model;
pub mod prompt;
pub mod tasks;

pub use agent::{Agent, Observation};
pub use config::AgentConfig;
pub use error::AgentError;
pub use github::GithubClient;
pub use model::{CompletionClient, InferenceClient};
pub use prompt::ConversationTurn;
