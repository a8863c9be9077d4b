//! Whole-prompt budgeting for the conversational task.
//!
//! The chat prompt embeds a README slice, every prior turn, and the new
//! question. When the assembled prompt strictly exceeds the whole-prompt
//! budget, the entire history is condensed into one summary with a single
//! oracle call and a second, condensed prompt is sent in its place. This is
//! one round of condensation; the condensed prompt is not re-checked.
//!
//! Exactly one terminal generation call happens per request, whichever
//! branch is taken.

use super::{char_len, take_chars, TRUNCATION_MARKER};
use crate::config::Limits;
use crate::error::AgentError;
use crate::model::CompletionClient;
use crate::prompt::{context_block, render_turns, ConversationTurn, PromptTemplate, Role};
use tracing::{info, warn};

const CHAT_SYSTEM_PROMPT: &str = "\
You are a GitHub project expert assistant. Answer based only on the README and context. \
If you don't know, say \"I do not have that information in the README.\"";

const CONDENSE_SYSTEM_PROMPT: &str =
    "Condense this discussion into a short summary keeping all technical meaning.";

const CONDENSED_ANSWER_PROMPT: &str =
    "Use this conversation summary and the README to answer:";

const MISSING_README: &str = "No README.md content available.";

/// Answer a question about a repository, grounded in its README and the
/// prior conversation.
pub async fn chat(
    oracle: &dyn CompletionClient,
    limits: &Limits,
    readme: Option<&str>,
    history: &[ConversationTurn],
    question: &str,
) -> Result<String, AgentError> {
    let readme = match readme {
        Some(text) if !text.is_empty() => text,
        _ => MISSING_README,
    };
    let readme_slice = take_chars(readme, limits.chat_readme_slice);
    let history_text = render_turns(history);

    let mut template = PromptTemplate::new()
        .system(CHAT_SYSTEM_PROMPT)
        .raw(context_block("README_CONTEXT", readme_slice));
    if !history_text.is_empty() {
        template = template.raw(&history_text);
    }
    let full_prompt = template.turn(Role::User, question).render();

    let size = char_len(&full_prompt);
    info!("chat prompt size: {size} chars (budget {})", limits.chat_prompt);

    // Condensation needs history to condense; an oversized prompt with no
    // prior turns is sent as-is, single-pass best effort.
    if size <= limits.chat_prompt || history.is_empty() {
        return oracle.complete(&full_prompt).await;
    }

    info!("chat prompt over budget, condensing {} prior turns", history.len());
    let summary = condense_history(oracle, limits, &history_text).await;

    let condensed_prompt = PromptTemplate::new()
        .system(CONDENSED_ANSWER_PROMPT)
        .raw(context_block("SUMMARY", &summary))
        .raw(context_block("README_CONTEXT", readme_slice))
        .turn(Role::User, question)
        .render();

    oracle.complete(&condensed_prompt).await
}

/// Summarize the whole history block with one oracle call, falling back to
/// hard truncation when the call fails.
async fn condense_history(
    oracle: &dyn CompletionClient,
    limits: &Limits,
    history_text: &str,
) -> String {
    let prompt = PromptTemplate::new()
        .system(CONDENSE_SYSTEM_PROMPT)
        .turn(Role::User, take_chars(history_text, limits.chat_prompt * 2))
        .render();

    match oracle.complete(&prompt).await {
        Ok(summary) => summary,
        Err(err) => {
            warn!("history condensation failed ({err}), truncating instead");
            let mut out = take_chars(history_text, limits.chat_prompt).to_string();
            out.push_str(TRUNCATION_MARKER);
            out
        }
    }
}
