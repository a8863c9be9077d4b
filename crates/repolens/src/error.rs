//! Error taxonomy shared by every component.
//!
//! The variants map onto propagation policies rather than sources: fetch
//! failures degrade to absent artifacts, act/chat failures degrade to an
//! error-shaped response, and only truly unexpected failures reach the
//! top-level handler.

use thiserror::Error;

/// All failures the agent can surface to a caller.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No matching route or artifact. Non-fatal for fetches, where it
    /// becomes a default/absent value instead.
    #[error("not found: {0}")]
    NotFound(String),

    /// A remote call failed at the transport level.
    #[error("transport error: {0}")]
    Transport(String),

    /// The text-generation oracle errored or returned a malformed envelope.
    /// Callers decide fallback behavior; this layer never swallows it.
    #[error("inference error: {0}")]
    Inference(String),

    /// A required request field is missing or has the wrong shape.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Transport(err.to_string())
    }
}
