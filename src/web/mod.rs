//! Web front end: a single form page and a download endpoint.

use anyhow::Context;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod flash;
pub mod handlers;

use crate::config::Config;
use crate::extractors::PlatformClient;
use crate::service::ExtractionService;
use crate::Result;
use flash::FlashSigner;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ExtractionService>,
    pub flash: Arc<FlashSigner>,
}

impl AppState {
    pub fn new(config: &Config, client: Arc<dyn PlatformClient>) -> Result<Self> {
        let service = ExtractionService::new(
            client,
            config.storage.clone(),
            config.extractor.max_concurrent_extractions,
        );

        Ok(Self {
            service: Arc::new(service),
            flash: Arc::new(FlashSigner::new(&config.server.secret_key)?),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/download/{kind}/{filename}", get(handlers::download))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: Config, client: Arc<dyn PlatformClient>) -> Result<()> {
    let addr = config.bind_addr()?;
    let app = router(AppState::new(&config, client)?);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
