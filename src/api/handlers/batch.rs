//! Handler for batch shortening.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use super::shorten::json_rejection;
use crate::api::dto::batch::{BatchRequestItem, BatchResponseItem};
use crate::api::middleware::auth::CurrentUser;
use crate::domain::entities::BatchItem;
use crate::error::AppError;
use crate::state::AppState;

/// Shortens many URLs in one storage write.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [
///   { "correlation_id": "1", "original_url": "https://example.com" },
///   { "correlation_id": "2", "original_url": "https://rust-lang.org" }
/// ]
/// ```
///
/// # Response
///
/// **201 Created**, one entry per input in the same order:
///
/// ```json
/// [
///   { "correlation_id": "1", "short_url": "http://localhost:8080/Ab3dE5gH" },
///   { "correlation_id": "2", "short_url": "http://localhost:8080/x9Yz1kLm" }
/// ]
/// ```
///
/// Batch items are never deduplicated; every item gets a fresh short URL.
///
/// # Errors
///
/// Returns 400 Bad Request if the batch is empty or any item is invalid.
/// Nothing is stored in that case.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<Vec<BatchRequestItem>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<BatchResponseItem>>), AppError> {
    let Json(payload) = payload.map_err(json_rejection)?;

    if payload.is_empty() {
        return Err(AppError::bad_request(
            "Empty batch",
            json!({ "reason": "At least one URL is required" }),
        ));
    }

    for (index, item) in payload.iter().enumerate() {
        item.validate().map_err(|e| {
            AppError::bad_request(
                "Validation failed",
                json!({ "index": index, "reason": e.to_string() }),
            )
        })?;
    }

    let items: Vec<BatchItem> = payload.into_iter().map(BatchItem::from).collect();
    let results = state.url_service.shorten_batch(&items, &user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(results.into_iter().map(BatchResponseItem::from).collect()),
    ))
}
