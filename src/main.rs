use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tracing_subscriber::EnvFilter;

use kb_answer::api;
use kb_answer::config::Config;
use kb_answer::state::AppState;
use kb_answer::telemetry::TracingTelemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Answering for: {}", config.org_name);
    tracing::info!(
        "LLM endpoint: {} (chat: {}, embeddings: {})",
        config.llm.base_url,
        config.llm.chat_model,
        config.llm.embedding_model
    );
    tracing::info!("Vector index: {}", config.vector.base_url);

    let state = AppState::new(config.clone(), Arc::new(TracingTelemetry))?;

    let app = Router::new()
        .route("/api/answer", post(api::answer::answer))
        .route("/api/similar", post(api::similar::similar))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
