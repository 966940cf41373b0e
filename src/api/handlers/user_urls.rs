//! Handlers for a user's own URLs.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::shorten::json_rejection;
use crate::api::dto::user_urls::{DeleteUrlsRequest, UserUrlResponse};
use crate::api::middleware::auth::RequireUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's live URLs.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response
///
/// - **200 OK** with `[{"short_url": ..., "original_url": ...}]`
/// - **204 No Content** when the user has no live URLs
///
/// # Errors
///
/// Returns 401 Unauthorized without a valid identity cookie.
pub async fn user_urls_handler(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Response, AppError> {
    let urls = state.url_service.get_urls_by_user_id(&user_id).await?;

    if urls.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<UserUrlResponse> = urls.into_iter().map(UserUrlResponse::from).collect();
    Ok(Json(body).into_response())
}

/// Deletes the caller's URLs in the background.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["Ab3dE5gH", "x9Yz1kLm"]
/// ```
///
/// Responds **202 Accepted** once deletion has been dispatched. IDs owned by
/// other users are ignored.
///
/// # Errors
///
/// Returns 401 Unauthorized without a valid identity cookie and 400 Bad
/// Request on a malformed body.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    payload: Result<Json<DeleteUrlsRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(short_ids) = payload.map_err(json_rejection)?;

    if short_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(AppError::bad_request(
            "Validation failed",
            json!({ "reason": "Short IDs must not be empty" }),
        ));
    }

    state.url_service.delete_urls(short_ids, &user_id).await?;

    Ok(StatusCode::ACCEPTED)
}
