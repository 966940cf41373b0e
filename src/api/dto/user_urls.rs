//! DTOs for the per-user URL endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::entities::UserUrl;

/// One element of the `GET /api/user/urls` response array.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUrlResponse {
    pub short_url: String,
    pub original_url: String,
}

impl From<UserUrl> for UserUrlResponse {
    fn from(url: UserUrl) -> Self {
        Self {
            short_url: url.short_url,
            original_url: url.original_url,
        }
    }
}

/// `DELETE /api/user/urls` request body: a bare array of short IDs.
pub type DeleteUrlsRequest = Vec<String>;
