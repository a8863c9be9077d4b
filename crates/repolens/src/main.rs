//! Observe a repository, run an analysis task, or ask a question from the
//! command line.
//!
//! Reads configuration from the environment: `REPOLENS_INFERENCE_URL`
//! (required), `REPOLENS_INFERENCE_KEY`, `REPOLENS_MODEL`, `GITHUB_TOKEN`.
//!
//! # Examples
//!
//! ```sh
//! # Collect repository artifacts as JSON
//! repolens observe https://github.com/rust-lang/rust
//!
//! # Fetch one file
//! repolens file rust-lang/rust src/lib.rs
//!
//! # Run a task over previously observed data
//! repolens observe rust-lang/rust > observed.json
//! repolens act "Identify Tech Stack & Dependencies" --data-file observed.json
//!
//! # Ask a question about a README
//! repolens chat "How do I build this?" --readme-file README.md
//! ```

use clap::{Parser, Subcommand};
use repolens::prompt::ConversationTurn;
use repolens::{Agent, AgentConfig};
use std::process;

/// GitHub repository observation and LLM analysis agent.
#[derive(Parser)]
#[command(name = "repolens")]
struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect README, file tree, commits, languages, and manifests.
    Observe {
        /// Repository URL or owner/name slug.
        repo_url: String,
    },
    /// Fetch and decode one file from a repository.
    File {
        /// Repository owner/name slug.
        repo: String,
        /// Path of the file within the repository.
        path: String,
    },
    /// Run one named analysis task over a JSON payload.
    Act {
        /// Task name, e.g. "Summarize Repo Purpose".
        task: String,
        /// Inline JSON payload for the task.
        #[arg(long, conflicts_with = "data_file")]
        data: Option<String>,
        /// Read the JSON payload from a file instead.
        #[arg(long)]
        data_file: Option<String>,
    },
    /// Ask a question grounded in a README and optional prior turns.
    Chat {
        /// The question to answer.
        question: String,
        /// File containing the README text.
        #[arg(long)]
        readme_file: Option<String>,
        /// File containing prior turns as a JSON array of
        /// {"user": ..., "agent": ...} objects.
        #[arg(long)]
        history_file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = AgentConfig::from_env().map_err(|e| e.to_string())?;
    let agent = Agent::from_config(config).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Observe { repo_url } => {
            let observation = agent.observe(&repo_url).await.map_err(|e| e.to_string())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&observation).map_err(|e| e.to_string())?
            );
        }

        Command::File { repo, path } => match agent.file_contents(&repo, &path).await {
            Some(text) => println!("{text}"),
            None => {
                eprintln!("could not fetch {path} from {repo}");
                process::exit(1);
            }
        },

        Command::Act {
            task,
            data,
            data_file,
        } => {
            let raw = match (data, data_file) {
                (Some(inline), _) => inline,
                (None, Some(path)) => {
                    std::fs::read_to_string(&path).map_err(|e| format!("read {path}: {e}"))?
                }
                (None, None) => String::from("null"),
            };
            let payload: serde_json::Value =
                serde_json::from_str(&raw).map_err(|e| format!("invalid JSON payload: {e}"))?;
            let result = agent.act(&task, &payload).await.map_err(|e| e.to_string())?;
            println!("{result}");
        }

        Command::Chat {
            question,
            readme_file,
            history_file,
        } => {
            let readme = match readme_file {
                Some(path) => Some(
                    std::fs::read_to_string(&path).map_err(|e| format!("read {path}: {e}"))?,
                ),
                None => None,
            };
            let history: Vec<ConversationTurn> = match history_file {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .map_err(|e| format!("read {path}: {e}"))?;
                    serde_json::from_str(&raw).map_err(|e| format!("invalid history: {e}"))?
                }
                None => Vec::new(),
            };
            let answer = agent
                .chat(readme.as_deref(), &history, &question)
                .await
                .map_err(|e| e.to_string())?;
            println!("{answer}");
        }
    }

    Ok(())
}
