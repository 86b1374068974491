use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triage_core::config::{history_file_from_env_value, kb_dir_from_env_value};
use triage_core::{CoreConfig, TriageService};

/// Main entry point for the triage server
///
/// Resolves configuration once, loads and validates the knowledge base, opens the history log
/// and serves the REST API.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `TRIAGE_HISTORY_FILE`: History log (default: "triage_data/triage_history.jsonl")
/// - `TRIAGE_KB_DIR`: Optional directory replacing the built-in knowledge base
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, knowledge-base loading or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        history_file_from_env_value(std::env::var("TRIAGE_HISTORY_FILE").ok()),
        kb_dir_from_env_value(std::env::var("TRIAGE_KB_DIR").ok()),
    )?;
    tracing::info!(
        history_file = %cfg.history_file().display(),
        kb_dir = ?cfg.kb_dir(),
        "configuration resolved"
    );

    let service = TriageService::from_config(&cfg)?;

    tracing::info!("++ Starting triage REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("triage server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
