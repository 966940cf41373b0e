//! Handlers for single-URL shortening.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::check_url;

/// Shortens a URL sent as a plain-text body.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response
///
/// - **201 Created**: body is the new short URL
/// - **409 Conflict**: the URL was already shortened; body is the existing short URL
///
/// # Errors
///
/// Returns 400 Bad Request if the body is empty or not an http(s) URL.
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    body: String,
) -> Result<Response, AppError> {
    let original_url = body.trim();

    check_url(original_url).map_err(|e| {
        AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() }))
    })?;

    let result = state.url_service.shorten(original_url, &user_id).await?;

    let status = if result.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };

    Ok((status, result.short_url).into_response())
}

/// Shortens a URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/abc12345" }
/// ```
///
/// Status is 201 for a new short URL and 409 when the URL was already shortened.
///
/// # Errors
///
/// Returns 400 Bad Request on malformed JSON or an invalid URL.
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(json_rejection)?;
    payload.validate()?;

    let result = state.url_service.shorten(&payload.url, &user_id).await?;

    let status = if result.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };

    Ok((
        status,
        Json(ShortenResponse {
            result: result.short_url,
        }),
    )
        .into_response())
}

/// Maps an axum JSON extraction failure to a 400 response.
pub(crate) fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::bad_request(
        "Invalid JSON body",
        json!({ "reason": rejection.body_text() }),
    )
}
