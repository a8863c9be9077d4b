//! Run the repolens HTTP router.
//!
//! Reads configuration from the environment: `REPOLENS_INFERENCE_URL`
//! (required), `REPOLENS_INFERENCE_KEY`, `REPOLENS_MODEL`, `GITHUB_TOKEN`.
//!
//! # Usage
//!
//! ```bash
//! REPOLENS_INFERENCE_URL=https://llm.internal/generate cargo run -p repolens-web
//! cargo run -p repolens-web -- --port 8080
//! ```

use clap::Parser;
use repolens::{Agent, AgentConfig};
use repolens_web::{build_router, start_server};
use std::sync::Arc;

/// HTTP request router for the repolens agent.
#[derive(Parser)]
#[command(name = "repolens-web")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 3002)]
    port: u16,

    /// Override the model identifier from the environment.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    tracing_subscriber::fmt().init();

    let mut config = AgentConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(model) = args.model {
        config.model = model;
    }

    let agent = Agent::from_config(config).map_err(|e| e.to_string())?;
    let router = build_router(Arc::new(agent));

    let addr = start_server(router, ([127, 0, 0, 1], args.port).into()).await;
    println!("repolens listening on http://{addr}");

    // The server runs on a spawned task; park the main task forever.
    std::future::pending::<()>().await;
    Ok(())
}
