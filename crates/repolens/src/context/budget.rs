//! Per-field input budgeting with summarize-or-truncate fallback.
//!
//! A candidate segment moves through a small state machine: measure its
//! size, pass it through untouched if it fits, otherwise condense it with
//! one summarization call and substitute the result. A failed summarization
//! call degrades to hard truncation with a visible marker; it never becomes
//! a fatal error of the outer task.

use super::{char_len, take_chars};
use crate::model::CompletionClient;
use crate::prompt::{PromptTemplate, Role};
use tracing::{debug, warn};

/// Appended to hard-truncated text so the model (and a human reading logs)
/// can tell the segment was cut.
pub const TRUNCATION_MARKER: &str = "\n[Truncated due to size]";

/// Only this multiple of the budget is fed to the summarization call, so
/// the sub-call's own cost stays bounded.
const SUMMARIZE_INPUT_FACTOR: usize = 2;

const SUMMARIZE_SYSTEM_PROMPT: &str =
    "You are a summarizer. Condense this text into a clear, short summary under 500 words.";

/// Applies a character budget to one segment at a time.
pub struct Budgeter<'a> {
    oracle: &'a dyn CompletionClient,
}

impl<'a> Budgeter<'a> {
    pub fn new(oracle: &'a dyn CompletionClient) -> Self {
        Self { oracle }
    }

    /// Fit `text` under `limit` characters.
    ///
    /// At or under the limit the text passes through byte-identical, so
    /// re-running the budgeter on an already-fitted segment is a no-op.
    /// Over the limit, a bounded prefix is summarized through the oracle;
    /// a failed call, or a summary that still exceeds the limit, degrades
    /// to truncation with a marker.
    pub async fn fit(&self, text: &str, label: &str, limit: usize) -> String {
        let size = char_len(text);
        if size <= limit {
            return text.to_string();
        }

        debug!("{label} too large ({size} chars, budget {limit}), summarizing");
        let prompt = PromptTemplate::new()
            .system(SUMMARIZE_SYSTEM_PROMPT)
            .turn(
                Role::User,
                take_chars(text, limit * SUMMARIZE_INPUT_FACTOR),
            )
            .render();

        match self.oracle.complete(&prompt).await {
            Ok(summary) if char_len(&summary) <= limit => summary,
            Ok(summary) => {
                warn!(
                    "summary of {label} still oversized ({} chars, budget {limit}), truncating",
                    char_len(&summary)
                );
                truncate_with_marker(&summary, limit)
            }
            Err(err) => {
                warn!("summarization of {label} failed ({err}), truncating instead");
                truncate_with_marker(text, limit)
            }
        }
    }
}

fn truncate_with_marker(text: &str, limit: usize) -> String {
    let mut out = take_chars(text, limit).to_string();
    out.push_str(TRUNCATION_MARKER);
    out
}
