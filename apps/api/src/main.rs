mod config;
mod errors;
mod extract;
mod feedback;
mod interview;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{InterviewStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rehearsal API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage
    let store: Arc<dyn InterviewStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url, config.db_max_connections).await?),
        None => {
            warn!("DATABASE_URL not set; interviews and feedback are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.llm_timeout_secs
    );

    let state = AppState::new(store, Arc::new(llm), &config);
    if config.enable_follow_ups {
        info!(
            "Follow-up questions enabled (max {} per base question)",
            config.max_follow_ups_per_question
        );
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
