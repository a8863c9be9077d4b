//! Integration tests for the request router.
//!
//! These start a real axum server on a random port with a mock oracle
//! behind the agent, and exercise the four routes over HTTP.

use repolens::error::AgentError;
use repolens::model::{CompletionClient, CompletionFuture};
use repolens::{Agent, AgentConfig, GithubClient};
use repolens_web::{build_router, start_server};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Oracle that records prompts and replies with a fixed string.
struct MockOracle {
    prompts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl CompletionClient for MockOracle {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(AgentError::Inference("mock oracle failure".into()))
            } else {
                Ok("mock answer".to_string())
            }
        })
    }
}

/// Oracle that panics on every call, for exercising the panic envelope.
struct PanickingOracle;

impl CompletionClient for PanickingOracle {
    fn complete<'a>(&'a self, _prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(async { panic!("oracle exploded") })
    }
}

/// Spawn a server around the given oracle. GitHub is pointed at a dead port
/// so any accidental fetch fails fast instead of hitting the network.
async fn spawn_with_oracle<C: CompletionClient + 'static>(oracle: C) -> String {
    let config = AgentConfig::new("http://127.0.0.1:9/unused");
    let github = GithubClient::new(None)
        .unwrap()
        .with_base_url("http://127.0.0.1:9");
    let agent = Agent::new(config, github, oracle);

    let addr = start_server(build_router(Arc::new(agent)), ([127, 0, 0, 1], 0).into()).await;
    format!("http://{addr}")
}

async fn spawn_test_server(fail_oracle: bool) -> (String, Arc<Mutex<Vec<String>>>) {
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let oracle = MockOracle {
        prompts: Arc::clone(&prompts),
        fail: fail_oracle,
    };
    let base = spawn_with_oracle(oracle).await;
    (base, prompts)
}

async fn post(base: &str, path: &str, body: Value) -> (u16, Value) {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}{path}"))
        .header("Origin", "http://example.com")
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

// ── Routing and envelope ─────────────────────────────────────────────

#[tokio::test]
async fn unknown_route_returns_descriptive_404() {
    let (base, _) = spawn_test_server(false).await;
    let (status, body) = post(&base, "/frobnicate", json!({})).await;
    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("/frobnicate"));
}

#[tokio::test]
async fn cors_headers_are_always_present() {
    let (base, _) = spawn_test_server(false).await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/act"))
        .header("Origin", "http://example.com")
        .json(&json!({"task": "Nope"}))
        .send()
        .await
        .unwrap();
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn panic_envelope_still_carries_cors_headers() {
    let base = spawn_with_oracle(PanickingOracle).await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/chat"))
        .header("Origin", "http://example.com")
        .json(&json!({"question": "boom?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    assert!(
        resp.headers().contains_key("access-control-allow-origin"),
        "CORS headers must survive the panic path"
    );
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Internal server error"));
}

#[tokio::test]
async fn invalid_json_body_is_a_client_error() {
    let (base, _) = spawn_test_server(false).await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/act"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid JSON"));
}

// ── observe / get_file_content ───────────────────────────────────────

#[tokio::test]
async fn observe_requires_repo_url() {
    let (base, _) = spawn_test_server(false).await;
    let (status, body) = post(&base, "/observe", json!({})).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("repo_url"));
}

#[tokio::test]
async fn observe_rejects_malformed_reference() {
    let (base, _) = spawn_test_server(false).await;
    let (status, body) = post(&base, "/observe", json!({"repo_url": "nonsense"})).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("nonsense"));
}

#[tokio::test]
async fn get_file_content_requires_both_fields() {
    let (base, _) = spawn_test_server(false).await;
    let (status, body) = post(&base, "/get_file_content", json!({"repo_name": "o/r"})).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("file_path"));
}

#[tokio::test]
async fn get_file_content_degrades_to_null_when_unreachable() {
    // GitHub is a dead port here; the fetch fails and the artifact is null.
    let (base, _) = spawn_test_server(false).await;
    let (status, body) = post(
        &base,
        "/get_file_content",
        json!({"repo_name": "o/r", "file_path": "README.md"}),
    )
    .await;
    assert_eq!(status, 200);
    assert!(body.is_null());
}

// ── act ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn act_unknown_task_names_the_task_without_oracle_call() {
    let (base, prompts) = spawn_test_server(false).await;
    let (status, body) = post(&base, "/act", json!({"task": "Make Coffee", "data": {}})).await;
    assert_eq!(status, 200);
    assert!(body["error"].as_str().unwrap().contains("Make Coffee"));
    assert!(prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn act_missing_task_field_is_a_client_error() {
    let (base, _) = spawn_test_server(false).await;
    let (status, body) = post(&base, "/act", json!({"data": {}})).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("task"));
}

#[tokio::test]
async fn act_summarize_returns_oracle_result() {
    let (base, prompts) = spawn_test_server(false).await;
    let (status, body) = post(
        &base,
        "/act",
        json!({"task": "Summarize Repo Purpose", "data": "A small parser library."}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "mock answer");
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("A small parser library."));
}

#[tokio::test]
async fn act_with_empty_commits_short_circuits() {
    let (base, prompts) = spawn_test_server(false).await;
    let (status, body) = post(
        &base,
        "/act",
        json!({"task": "Analyze Activity Trends", "data": {"commits": []}}),
    )
    .await;
    assert_eq!(status, 200);
    assert!(body["result"].as_str().unwrap().contains("No commit data"));
    assert!(prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn act_oracle_failure_is_an_error_result_not_a_crash() {
    let (base, _) = spawn_test_server(true).await;
    let (status, body) = post(
        &base,
        "/act",
        json!({"task": "Summarize Repo Purpose", "data": "readme"}),
    )
    .await;
    assert_eq!(status, 200);
    assert!(body["error"].as_str().unwrap().contains("inference error"));
}

// ── chat ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_requires_question() {
    let (base, _) = spawn_test_server(false).await;
    let (status, body) = post(&base, "/chat", json!({"readme_content": "r"})).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("question"));
}

#[tokio::test]
async fn chat_under_budget_sends_one_verbatim_prompt() {
    let (base, prompts) = spawn_test_server(false).await;
    let (status, body) = post(
        &base,
        "/chat",
        json!({
            "readme_content": "# Project docs",
            "chat_history": [{"user": "hi", "agent": "hello"}],
            "question": "What is this?"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "mock answer");
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("# Project docs"));
    assert!(prompts[0].contains("What is this?"));
}

#[tokio::test]
async fn chat_over_budget_condenses_history_first() {
    let (base, prompts) = spawn_test_server(false).await;
    let long_turn = "x".repeat(8_000);
    let (status, body) = post(
        &base,
        "/chat",
        json!({
            "readme_content": "docs",
            "chat_history": [{"user": long_turn, "agent": "ok"}],
            "question": "And now?"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "mock answer");
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2, "one condensation call, one terminal call");
    assert!(prompts[1].contains("<SUMMARY>"));
}

#[tokio::test]
async fn chat_with_malformed_history_is_a_client_error() {
    let (base, _) = spawn_test_server(false).await;
    let (status, body) = post(
        &base,
        "/chat",
        json!({"question": "q", "chat_history": "not a list"}),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("chat_history"));
}
