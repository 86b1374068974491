//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the triage REST API on its own, with the same router the workspace's `triage-run`
//! binary serves.
//!
//! ## Intended use
//! Development and debugging against a scratch history file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::config::{history_file_from_env_value, kb_dir_from_env_value};
use triage_core::{CoreConfig, TriageService};

/// Main entry point for the triage REST API server
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `TRIAGE_HISTORY_FILE`: History log (default: "triage_data/triage_history.jsonl")
/// - `TRIAGE_KB_DIR`: Optional knowledge-base override directory
///
/// # Errors
/// Fails when the log filter directive does not parse, when `CoreConfig` or the knowledge base
/// is rejected, or when binding and serving the listener fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        history_file_from_env_value(std::env::var("TRIAGE_HISTORY_FILE").ok()),
        kb_dir_from_env_value(std::env::var("TRIAGE_KB_DIR").ok()),
    )?;
    let service = TriageService::from_config(&cfg)?;

    tracing::info!("-- Starting triage REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api_rest::router(service)).await?;

    Ok(())
}
