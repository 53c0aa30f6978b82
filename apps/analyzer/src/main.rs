mod analysis;
mod config;
mod errors;
mod extraction;
mod gate;
mod heuristic;
mod history;
mod llm_client;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::RemoteAnalyzer;
use crate::config::{Config, HistoryBackend};
use crate::gate::AnalysisGate;
use crate::history::backend::{FileBlobStore, MemoryBlobStore, RedisBlobStore};
use crate::history::{BlobStore, HistoryStore};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analyzer v{}", env!("CARGO_PKG_VERSION"));

    let llm = match &config.groq_api_key {
        Some(key) => {
            let client =
                LlmClient::new(key.clone(), Duration::from_secs(config.llm_timeout_secs))?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("GROQ_API_KEY not set; analyses will return the fallback report");
            None
        }
    };

    let backend = open_history_backend(&config.history_backend)?;

    let state = AppState {
        analyzer: RemoteAnalyzer::new(llm),
        history: Arc::new(HistoryStore::new(backend)),
        gate: AnalysisGate::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn open_history_backend(backend: &HistoryBackend) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match backend {
        HistoryBackend::File(dir) => {
            info!("History stored under {}", dir.display());
            Arc::new(FileBlobStore::new(dir.clone()))
        }
        HistoryBackend::Redis(url) => {
            info!("History stored in Redis");
            Arc::new(RedisBlobStore::open(url)?)
        }
        HistoryBackend::Memory => {
            warn!("History kept in memory only; it is lost on restart");
            Arc::new(MemoryBlobStore::new())
        }
    };
    Ok(store)
}
