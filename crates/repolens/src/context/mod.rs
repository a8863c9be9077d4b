//! Context-budget management: size measurement, per-field summarization,
//! and whole-prompt chat condensation.
//!
//! All budgets are character counts (Unicode scalar values) used as a proxy
//! for the model's context window. Helpers here never split inside a code
//! point, so truncation is safe on any input.

pub mod budget;
pub mod condenser;

pub use budget::{Budgeter, TRUNCATION_MARKER};

/// Character count of a string (scalar values, not bytes).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Borrow at most the first `n` characters of `s`.
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}
