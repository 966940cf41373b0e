//! DTOs for the single-URL shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::url_validator::validate_http_url;

/// `POST /api/shorten` request body.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(custom(function = "validate_http_url"))]
    pub url: String,
}

/// `POST /api/shorten` response body, for both new and existing short URLs.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub result: String,
}
