//! Route handlers and the uniform response envelope.
//!
//! Every response, whether success, degraded, or failed, is a JSON body with an
//! HTTP status, and CORS headers are always attached by the router layer.
//! Task- and chat-level failures come back as `{"error": ...}` with a
//! success status (the operation completed, its result is an error shape);
//! missing request fields are client errors; unknown paths are 404; only
//! panics become the generic 500 envelope.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use repolens::model::CompletionClient;
use repolens::prompt::ConversationTurn;
use repolens::Agent;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tracing::error;

/// Shared application state: the process-wide agent.
pub struct AppState<C: CompletionClient> {
    pub agent: Arc<Agent<C>>,
}

impl<C: CompletionClient> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            agent: Arc::clone(&self.agent),
        }
    }
}

/// Build the full router: the four operations, a descriptive 404 fallback,
/// permissive CORS, and a panic-to-500 safety net.
pub fn build_router<C: CompletionClient + 'static>(agent: Arc<Agent<C>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(CorsAny)
        .allow_methods(CorsAny)
        .allow_headers(CorsAny);

    Router::new()
        .route("/observe", post(observe::<C>))
        .route("/get_file_content", post(get_file_content::<C>))
        .route("/act", post(act::<C>))
        .route("/chat", post(chat::<C>))
        .fallback(unknown_route)
        .with_state(AppState { agent })
        // CORS outermost, so even a synthesized panic response carries the
        // headers.
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
}

// ── Envelope helpers ───────────────────────────────────────────────

type Envelope = (StatusCode, Json<Value>);

fn error_envelope(status: StatusCode, message: impl AsRef<str>) -> Envelope {
    (status, Json(json!({"error": message.as_ref()})))
}

fn bad_request(message: impl AsRef<str>) -> Envelope {
    error_envelope(StatusCode::BAD_REQUEST, message)
}

/// Parse the raw request body as a JSON object, treating an empty body as
/// an empty object so field checks produce field-level messages.
fn parse_body(raw: &str) -> Result<Value, Envelope> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw).map_err(|e| bad_request(format!("invalid JSON body: {e}")))
}

fn required_str<'a>(body: &'a Value, field: &str) -> Result<&'a str, Envelope> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| bad_request(format!("missing required field: {field}")))
}

// ── Handlers ───────────────────────────────────────────────────────

/// POST /observe: collect all artifacts for one repository.
async fn observe<C: CompletionClient>(
    State(app): State<AppState<C>>,
    raw: String,
) -> Envelope {
    let body = match parse_body(&raw) {
        Ok(body) => body,
        Err(envelope) => return envelope,
    };
    let repo_url = match required_str(&body, "repo_url") {
        Ok(value) => value,
        Err(envelope) => return envelope,
    };

    match app.agent.observe(repo_url).await {
        Ok(observation) => match serde_json::to_value(&observation) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => error_envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {e}"),
            ),
        },
        Err(err) => bad_request(err.to_string()),
    }
}

/// POST /get_file_content: decoded file text, or JSON null when absent.
async fn get_file_content<C: CompletionClient>(
    State(app): State<AppState<C>>,
    raw: String,
) -> Envelope {
    let body = match parse_body(&raw) {
        Ok(body) => body,
        Err(envelope) => return envelope,
    };
    let repo_name = match required_str(&body, "repo_name") {
        Ok(value) => value,
        Err(envelope) => return envelope,
    };
    let file_path = match required_str(&body, "file_path") {
        Ok(value) => value,
        Err(envelope) => return envelope,
    };

    let content = app.agent.file_contents(repo_name, file_path).await;
    (StatusCode::OK, Json(json!(content)))
}

/// POST /act: run one named task; failures are error-shaped results.
async fn act<C: CompletionClient>(State(app): State<AppState<C>>, raw: String) -> Envelope {
    let body = match parse_body(&raw) {
        Ok(body) => body,
        Err(envelope) => return envelope,
    };
    let task = match required_str(&body, "task") {
        Ok(value) => value,
        Err(envelope) => return envelope,
    };
    let data = body.get("data").cloned().unwrap_or(Value::Null);

    match app.agent.act(task, &data).await {
        Ok(result) => (StatusCode::OK, Json(json!({"result": result}))),
        Err(err) => (StatusCode::OK, Json(json!({"error": err.to_string()}))),
    }
}

/// POST /chat: answer a question grounded in the README and history.
async fn chat<C: CompletionClient>(State(app): State<AppState<C>>, raw: String) -> Envelope {
    let body = match parse_body(&raw) {
        Ok(body) => body,
        Err(envelope) => return envelope,
    };
    let question = match required_str(&body, "question") {
        Ok(value) => value,
        Err(envelope) => return envelope,
    };
    let readme = body.get("readme_content").and_then(Value::as_str);
    let history: Vec<ConversationTurn> = match body.get("chat_history") {
        None | Some(Value::Null) => Vec::new(),
        Some(raw_history) => match serde_json::from_value(raw_history.clone()) {
            Ok(history) => history,
            Err(e) => return bad_request(format!("invalid chat_history: {e}")),
        },
    };

    match app.agent.chat(readme, &history, question).await {
        Ok(result) => (StatusCode::OK, Json(json!({"result": result}))),
        Err(err) => (StatusCode::OK, Json(json!({"error": err.to_string()}))),
    }
}

/// Fallback for unknown routing targets.
async fn unknown_route(uri: Uri) -> Envelope {
    error_envelope(
        StatusCode::NOT_FOUND,
        format!("Invalid path: {}", uri.path()),
    )
}

/// Convert an escaped panic into the generic server-error envelope, so the
/// client always receives well-formed JSON.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    error!("request handler panicked: {detail}");
    error_envelope(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Internal server error: {detail}"),
    )
    .into_response()
}
