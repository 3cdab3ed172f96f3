mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::gemini::{GeminiClient, MODEL};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::forwarder::{redacted_target, WorkflowForwarder};

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast when GEMINI_API_KEY or N8N_WEBHOOK_URL is missing
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screening API v{}", env!("CARGO_PKG_VERSION"));

    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_api_base,
        config.llm_timeout,
    )?;
    let llm = LlmClient::new(Arc::new(gemini));
    info!("LLM client initialized (model: {MODEL})");

    let forwarder = WorkflowForwarder::new(config.webhook_url.clone(), config.webhook_timeout)?;
    info!(
        "Workflow forwarder targets {}",
        redacted_target(&config.webhook_url)
    );

    let state = AppState {
        llm,
        forwarder,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
