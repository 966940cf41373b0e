//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short ID to its original URL.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// Returns 307 Temporary Redirect with the original URL in `Location`.
///
/// # Errors
///
/// Returns 410 Gone when the ID is unknown or was deleted. The two cases are
/// deliberately indistinguishable.
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    match state.url_service.get(&id).await {
        Some(original_url) => Ok(Redirect::temporary(&original_url)),
        None => {
            debug!(short_id = %id, "Short ID not found");
            Err(AppError::gone("URL not found", json!({ "id": id })))
        }
    }
}
