//! HTTP surface of the quote service.

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::core::config::ServerConfig;
use crate::core::{QuoteProvider, QuoteStore};
use crate::providers::AwesomeApiProvider;
use crate::store::{SqliteQuoteStore, UnavailableStore};

/// Everything a request handler needs, injected through axum `State`.
pub struct AppState {
    pub provider: Arc<dyn QuoteProvider>,
    pub store: Arc<dyn QuoteStore>,
    pub fetch_timeout: Duration,
    pub store_timeout: Duration,
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/cotacao", get(handlers::get_quote))
        .route("/cotacoes", get(handlers::get_history))
        .with_state(state)
}

/// Opens the quote log. Failures are logged and the server keeps running
/// without persistence.
pub fn open_store(path: &Path) -> Arc<dyn QuoteStore> {
    let store = match SqliteQuoteStore::open(path) {
        Ok(store) => store,
        Err(e) => {
            error!(
                error = %e,
                path = %path.display(),
                "Database unavailable, quotes will not be saved"
            );
            return Arc::new(UnavailableStore);
        }
    };

    if let Err(e) = store.ensure_schema() {
        error!(error = %e, "Failed to create quotes table");
    }
    Arc::new(store)
}

pub fn build_state(config: &ServerConfig) -> Result<Arc<AppState>> {
    let provider = AwesomeApiProvider::new(&config.upstream_base_url, &config.pair)?;
    let store = open_store(&config.database_path);

    Ok(Arc::new(AppState {
        provider: Arc::new(provider),
        store,
        fetch_timeout: config.fetch_timeout(),
        store_timeout: config.store_timeout(),
    }))
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

pub async fn serve(config: &ServerConfig) -> Result<()> {
    let state = build_state(config)?;

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Servidor rodando em {}", listener.local_addr()?);

    serve_on(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
