//! Role-delimited prompt assembly.
//!
//! Every prompt the agent sends is built here, from named segments rendered
//! with a fixed delimiter grammar (Llama-3-instruct header markers). The
//! marker strings exist only in this module, so a delimiter change happens
//! in exactly one place.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Delimiter grammar ──────────────────────────────────────────────

pub const BEGIN_OF_TEXT: &str = "<|begin_of_text|>";
pub const HEADER_START: &str = "<|start_header_id|>";
pub const HEADER_END: &str = "<|end_header_id|>";
pub const END_OF_TURN: &str = "<|eot_id|>";

/// Role tag for a prompt segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

// ── Conversation history ───────────────────────────────────────────

/// One prior exchange: the user's utterance and the agent's reply.
/// Supplied by the caller in chronological order on every chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub agent: String,
}

/// Render prior turns as alternating user/assistant segments, without the
/// begin-of-text marker. The result embeds directly into a larger template
/// and is also what the condenser measures and summarizes as one block.
pub fn render_turns(turns: &[ConversationTurn]) -> String {
    let mut out = String::new();
    for turn in turns {
        out.push_str(&render_segment(Role::User, &turn.user));
        out.push_str(&render_segment(Role::Assistant, &turn.agent));
    }
    out
}

fn render_segment(role: Role, body: &str) -> String {
    format!("{HEADER_START}{role}{HEADER_END}\n{body}{END_OF_TURN}")
}

/// Wrap a context payload in a named tag block, e.g. `<README_CONTEXT>`.
pub fn context_block(tag: &str, body: &str) -> String {
    format!("<{tag}>\n{body}\n</{tag}>")
}

// ── Template ───────────────────────────────────────────────────────

enum Segment {
    Turn(Role, String),
    Raw(String),
}

/// A parameterized prompt skeleton: optional system segment, raw context
/// blocks, role-tagged turns, and a trailing open assistant segment that
/// signals where generation begins.
///
/// # Example
///
/// ```
/// use repolens::prompt::{PromptTemplate, Role};
///
/// let prompt = PromptTemplate::new()
///     .system("You are a summarizer.")
///     .turn(Role::User, "Condense this text.")
///     .render();
/// assert!(prompt.starts_with("<|begin_of_text|>"));
/// assert!(prompt.ends_with("<|start_header_id|>assistant<|end_header_id|>\n"));
/// ```
#[derive(Default)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system-instruction segment.
    pub fn system(self, body: impl Into<String>) -> Self {
        self.turn(Role::System, body)
    }

    /// Add a role-tagged segment.
    pub fn turn(mut self, role: Role, body: impl Into<String>) -> Self {
        self.segments.push(Segment::Turn(role, body.into()));
        self
    }

    /// Add pre-rendered content verbatim (context blocks, history text).
    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.segments.push(Segment::Raw(body.into()));
        self
    }

    /// Flatten to the single prompt string sent to the gateway, always
    /// terminated by an open assistant header.
    pub fn render(&self) -> String {
        let mut out = String::from(BEGIN_OF_TEXT);
        for segment in &self.segments {
            match segment {
                Segment::Turn(role, body) => out.push_str(&render_segment(*role, body)),
                Segment::Raw(body) => {
                    out.push('\n');
                    out.push_str(body);
                    out.push('\n');
                }
            }
        }
        out.push_str(&format!("{HEADER_START}{}{HEADER_END}\n", Role::Assistant));
        out
    }
}
