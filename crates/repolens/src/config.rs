//! Agent configuration: endpoints, credentials, generation parameters, and
//! the consolidated size-limit table.
//!
//! Nothing here is global. Binaries read the environment once at startup,
//! build one [`AgentConfig`], and thread it into each component at
//! construction. Library code never touches `std::env`.

/// Default model identifier sent to the inference endpoint.
pub const DEFAULT_MODEL: &str = "meta.llama3-8b-instruct-v1:0";

// ── Size limits ────────────────────────────────────────────────────

/// Every character-count threshold in the pipeline, in one place.
///
/// All limits are Unicode scalar counts, not bytes. The two budgets in the
/// first group drive summarization decisions; the slices in the second group
/// are fixed cuts applied before a segment is embedded in a prompt.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Per-field input budget for raw artifacts (README text, manifest
    /// files) before they are embedded in a task prompt.
    pub field_input: usize,
    /// Whole-prompt budget for the fully assembled chat prompt, history
    /// included.
    pub chat_prompt: usize,
    /// README slice embedded as chat context.
    pub chat_readme_slice: usize,
    /// README slice embedded as context for file explanation.
    pub explain_readme_slice: usize,
    /// File-content slice for file explanation.
    pub explain_file_slice: usize,
    /// Commit timestamps included in the activity-trend prompt.
    pub trend_date_cap: usize,
    /// Author logins included in the contributor prompt.
    pub contributor_cap: usize,
    /// Commits fetched per page.
    pub commit_page_size: usize,
    /// Upper bound on commit pages, so pagination always terminates.
    pub max_commit_pages: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            field_input: 6_000,
            chat_prompt: 7_000,
            chat_readme_slice: 40_000,
            explain_readme_slice: 6_000,
            explain_file_slice: 16_000,
            trend_date_cap: 100,
            contributor_cap: 200,
            commit_page_size: 100,
            max_commit_pages: 5,
        }
    }
}

// ── Generation parameters ──────────────────────────────────────────

/// Sampling settings for the oracle, constant across all call sites.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    /// Maximum tokens in the generated response.
    pub max_gen_len: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus-sampling threshold.
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_gen_len: 1024,
            temperature: 0.1,
            top_p: 0.9,
        }
    }
}

// ── Agent config ───────────────────────────────────────────────────

/// Everything the agent needs to talk to GitHub and the inference endpoint.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model identifier passed to the inference endpoint.
    pub model: String,
    /// URL of the text-generation endpoint.
    pub inference_url: String,
    /// Bearer token for the inference endpoint, if it requires one.
    pub inference_key: Option<String>,
    /// GitHub API token. Unauthenticated access works but is rate-limited.
    pub github_token: Option<String>,
    /// Sampling settings, shared by every oracle call.
    pub generation: GenerationParams,
    /// Consolidated size-limit table.
    pub limits: Limits,
}

impl AgentConfig {
    /// Build a config for the given inference endpoint with default limits.
    pub fn new(inference_url: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            inference_url: inference_url.into(),
            inference_key: None,
            github_token: None,
            generation: GenerationParams::default(),
            limits: Limits::default(),
        }
    }

    /// Read endpoint and credential settings from the environment.
    ///
    /// Recognized variables: `REPOLENS_INFERENCE_URL` (required),
    /// `REPOLENS_INFERENCE_KEY`, `REPOLENS_MODEL`, `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self, crate::error::AgentError> {
        let inference_url = std::env::var("REPOLENS_INFERENCE_URL").map_err(|_| {
            crate::error::AgentError::Validation(
                "REPOLENS_INFERENCE_URL is not set".to_string(),
            )
        })?;
        let mut config = Self::new(inference_url);
        if let Ok(model) = std::env::var("REPOLENS_MODEL") {
            config.model = model;
        }
        config.inference_key = std::env::var("REPOLENS_INFERENCE_KEY").ok();
        config.github_token = std::env::var("GITHUB_TOKEN").ok();
        Ok(config)
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the GitHub API token.
    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_match_documented_thresholds() {
        let limits = Limits::default();
        assert_eq!(limits.field_input, 6_000);
        assert_eq!(limits.chat_prompt, 7_000);
        assert_eq!(limits.chat_readme_slice, 40_000);
        assert_eq!(limits.explain_file_slice, 16_000);
        assert_eq!(limits.max_commit_pages, 5);
    }

    #[test]
    fn builder_overrides() {
        let config = AgentConfig::new("http://localhost:9/generate")
            .with_model("test-model")
            .with_github_token("tok");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.github_token.as_deref(), Some("tok"));
        assert_eq!(config.generation.max_gen_len, 1024);
    }
}
