//! Model gateway: the single seam between the agent and the text-generation
//! oracle.
//!
//! Everything upstream of this module works with one flattened prompt string
//! and one trimmed completion string. The [`CompletionClient`] trait keeps
//! the oracle swappable (and mockable in tests); [`InferenceClient`] is the
//! production implementation over HTTP.

use crate::config::{AgentConfig, GenerationParams};
use crate::error::AgentError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::debug;

/// Boxed future returned by [`CompletionClient::complete`].
///
/// Type alias to keep trait signatures and implementations readable.
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AgentError>> + Send + 'a>>;

/// A single-shot prompt-in/text-out oracle.
///
/// Implementations must trim surrounding whitespace from the generated text
/// and surface failures as [`AgentError::Inference`], never as silently
/// empty output.
pub trait CompletionClient: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a>;
}

// ── Wire types ─────────────────────────────────────────────────────

/// Request body for the inference endpoint.
#[derive(Serialize, Debug)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_gen_len: u32,
    temperature: f32,
    top_p: f32,
}

/// Response envelope from the inference endpoint.
#[derive(Deserialize, Debug)]
struct GenerationResponse {
    generation: Option<String>,
}

// ── HTTP client ────────────────────────────────────────────────────

/// HTTP client for the text-generation endpoint.
///
/// Generation parameters are fixed at construction and identical for every
/// call site, summarization sub-calls included.
pub struct InferenceClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    params: GenerationParams,
}

impl InferenceClient {
    /// Build a client from the agent configuration.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .user_agent("repolens/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AgentError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.inference_url.clone(),
            api_key: config.inference_key.clone(),
            model: config.model.clone(),
            params: config.generation,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        debug!(
            "inference request: model={}, prompt={} chars, max_gen_len={}, temp={}",
            self.model,
            prompt.chars().count(),
            self.params.max_gen_len,
            self.params.temperature,
        );

        let body = GenerationRequest {
            model: &self.model,
            prompt,
            max_gen_len: self.params.max_gen_len,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
        };

        let start = Instant::now();
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AgentError::Inference(format!("request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AgentError::Inference(format!("failed to read response: {e}")))?;

        debug!(
            "inference response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(AgentError::Inference(format!(
                "inference endpoint HTTP {status}: {text}"
            )));
        }

        let parsed: GenerationResponse = serde_json::from_str(&text)
            .map_err(|e| AgentError::Inference(format!("malformed envelope: {e}")))?;

        match parsed.generation {
            Some(generation) => Ok(generation.trim().to_string()),
            None => Err(AgentError::Inference(
                "malformed envelope: missing generation field".to_string(),
            )),
        }
    }
}

impl CompletionClient for InferenceClient {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(self.generate(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_fixed_sampling_settings() {
        let body = GenerationRequest {
            model: "m",
            prompt: "p",
            max_gen_len: 1024,
            temperature: 0.1,
            top_p: 0.9,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_gen_len"], 1024);
        assert_eq!(json["model"], "m");
        assert!((json["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn envelope_without_generation_is_detected() {
        let parsed: GenerationResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.generation.is_none());
    }
}
