//! Gateway tests against a stub inference endpoint.

use axum::routing::post;
use axum::{http::StatusCode, Json, Router};
use repolens::error::AgentError;
use repolens::model::{CompletionClient, InferenceClient};
use repolens::AgentConfig;
use serde_json::{json, Value};

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base
}

fn gateway(base: &str) -> InferenceClient {
    let config = AgentConfig::new(format!("{base}/generate")).with_model("stub-model");
    InferenceClient::new(&config).unwrap()
}

#[tokio::test]
async fn output_is_whitespace_trimmed() {
    let base = spawn_stub(Router::new().route(
        "/generate",
        post(|| async { Json(json!({"generation": "  \n an answer \t\n"})) }),
    ))
    .await;

    let out = gateway(&base).complete("prompt").await.unwrap();
    assert_eq!(out, "an answer");
}

#[tokio::test]
async fn request_carries_prompt_and_fixed_parameters() {
    let base = spawn_stub(Router::new().route(
        "/generate",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["prompt"], "the prompt");
            assert_eq!(body["model"], "stub-model");
            assert_eq!(body["max_gen_len"], 1024);
            Json(json!({"generation": "ok"}))
        }),
    ))
    .await;

    assert_eq!(gateway(&base).complete("the prompt").await.unwrap(), "ok");
}

#[tokio::test]
async fn malformed_envelope_is_an_inference_error() {
    let base = spawn_stub(Router::new().route(
        "/generate",
        post(|| async { Json(json!({"unexpected": true})) }),
    ))
    .await;

    let err = gateway(&base).complete("prompt").await.unwrap_err();
    assert!(matches!(err, AgentError::Inference(_)));
    assert!(err.to_string().contains("generation"));
}

#[tokio::test]
async fn endpoint_failure_is_an_inference_error() {
    let base = spawn_stub(Router::new().route(
        "/generate",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "overloaded") }),
    ))
    .await;

    let err = gateway(&base).complete("prompt").await.unwrap_err();
    assert!(matches!(err, AgentError::Inference(_)));
    assert!(err.to_string().contains("500"));
}
