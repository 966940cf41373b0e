//! Handler for the storage connectivity check.

use axum::{extract::State, http::StatusCode};
use tracing::error;

use crate::state::AppState;

/// Checks the storage connection.
///
/// # Endpoint
///
/// `GET /ping`
///
/// # Response Codes
///
/// - **200 OK**: the database answered, or the backend has no database
/// - **500 Internal Server Error**: the database did not answer
pub async fn ping_handler(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.url_service.ping().await {
        Ok(()) => (StatusCode::OK, "Database connection is OK"),
        Err(e) if e.is_ping_not_supported() => {
            (StatusCode::OK, "Storage does not require database connection")
        }
        Err(e) => {
            error!(error = %e, "Database ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database connection failed",
            )
        }
    }
}
