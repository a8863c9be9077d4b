//! HTTP request router for the repolens agent.
//!
//! Exposes the four logical operations as POST routes with a uniform JSON
//! envelope and always-on CORS:
//!
//! - `POST /observe`: `{repo_url}` → collected repository artifacts
//! - `POST /get_file_content`: `{repo_name, file_path}` → decoded text
//! - `POST /act`: `{task, data}` → `{result}` or `{error}`
//! - `POST /chat`: `{readme_content, chat_history, question}` → `{result}`

use std::net::SocketAddr;

pub mod routes;

pub use routes::{build_router, AppState};

/// Start the axum server and return the bound address.
pub async fn start_server(router: axum::Router, bind_addr: SocketAddr) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind(bind_addr).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}
