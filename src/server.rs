//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, service construction, and the Axum server lifecycle.

use crate::application::services::UrlService;
use crate::config::Config;
use crate::infrastructure::persistence::select_storage;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::RandomShortIdGenerator;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL, file or memory)
/// - Short ID generator and URL service
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// Pending file writes are flushed after the server stops accepting requests.
///
/// # Errors
///
/// Returns an error if:
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = select_storage(
        &config.database_dsn,
        &config.file_storage_path,
        config.pg_pool_settings(),
    )
    .await;
    tracing::info!(backend = repository.backend_name(), "Storage ready");

    let generator = Arc::new(RandomShortIdGenerator::new(config.short_id_length));
    let url_service = Arc::new(UrlService::with_delete_workers(
        repository.clone(),
        generator,
        config.base_url.clone(),
        config.delete_workers,
    ));

    let state = AppState::new(url_service, &config.cookie_secret);
    let app = app_router(state);

    let listener = TcpListener::bind(&config.server_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_address))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = repository.close().await {
        tracing::error!(error = %e, "Failed to close storage");
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}
