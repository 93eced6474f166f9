mod analysis;
mod batch;
mod config;
mod errors;
mod history;
mod intake;
mod llm_client;
mod models;
mod routes;
mod settings;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::AnalysisClient;
use crate::config::Config;
use crate::history::HistoryStore;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::settings::Settings;
use crate::state::AppState;
use crate::storage::{KeyValueStore, MemoryStore, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize key-value storage (Redis, or process memory for local runs)
    let store: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => {
            let redis = redis::Client::open(url.as_str())?;
            Arc::new(RedisStore::connect(&redis).await?)
        }
        None => {
            warn!("REDIS_URL not set; settings and history are kept in memory only");
            Arc::new(
                config
                    .memory_store_capacity
                    .map_or_else(MemoryStore::new, MemoryStore::with_capacity),
            )
        }
    };

    // Initialize LLM client
    let provider = Arc::new(GeminiClient::new(config.gemini_base_url.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    if config.gemini_api_key.is_none() {
        info!("No GEMINI_API_KEY in environment; an API key must be set through the settings API");
    }

    let settings = Settings::new(
        store.clone(),
        config.gemini_api_key.clone(),
        config.output_language.clone(),
    );
    let history = HistoryStore::new(store);
    let state = AppState::new(settings, history, AnalysisClient::new(provider));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the front-end host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
