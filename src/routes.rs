//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /`      - Shorten a plain-text URL
//! - `GET  /ping`  - Storage connectivity check
//! - `GET  /{id}`  - Short URL redirect
//! - `/api/*`      - JSON API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Compression** - gzip responses, gzip request bodies accepted
//! - **Identity** - Signed user ID cookie on every request

use crate::api;
use crate::api::handlers::{ping_handler, redirect_handler, shorten_text_handler};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(shorten_text_handler))
        .route("/ping", get(ping_handler))
        .route("/{id}", get(redirect_handler))
        .nest("/api", api::routes::api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .with_state(state)
        .layer(RequestDecompressionLayer::new())
        .layer(CompressionLayer::new())
        .layer(tracing::layer())
}
