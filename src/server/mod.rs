//! HTTP API over the query service and the indexer.
//!
//! Provides JSON endpoints for:
//! - Indexed title search and crawl status/control
//! - Live category, listing, quality and file reads
//! - Final-link and one-shot best-stream resolution

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::crawler::{Indexer, PassGuard, PassOutcome};
use crate::query::QueryService;
use crate::storage::open_shared;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub query: Arc<QueryService>,
    pub indexer: Arc<Indexer>,
}

impl AppState {
    pub fn new(query: Arc<QueryService>) -> Self {
        let indexer = query.indexer().clone();
        Self { query, indexer }
    }

    /// Builds HTTP-backed state; the indexer and the query path get separate walkers
    ///
    /// An index that cannot be opened leaves the API up with index features disabled.
    pub fn from_config(config: &Config, config_hash: &str) -> anyhow::Result<Self> {
        let storage = match open_shared(&config.index) {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!("Index unavailable, serving without it: {}", e);
                None
            }
        };
        let indexer =
            Arc::new(Indexer::from_config(config, storage)?.with_config_hash(config_hash));
        let query = Arc::new(QueryService::from_config(config, indexer)?);
        Ok(Self::new(query))
    }
}

/// Runs one crawl pass on a background task under an already claimed guard.
pub fn spawn_pass(indexer: Arc<Indexer>, guard: PassGuard) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match indexer.run_claimed_pass(guard).await {
            Ok(PassOutcome::Completed(report)) => {
                tracing::info!("Background indexing finished: {} listings", report.upserted)
            }
            Ok(outcome) => tracing::debug!("Background indexing skipped: {:?}", outcome),
            Err(e) => tracing::error!("Background indexing failed: {}", e),
        }
    })
}

/// Start the API server, kicking off a background crawl pass first.
pub async fn serve(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let state = AppState::from_config(config, config_hash)?;
    if state.indexer.is_enabled() {
        if let Some(guard) = state.indexer.try_begin_pass() {
            spawn_pass(state.indexer.clone(), guard);
        }
    }

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
