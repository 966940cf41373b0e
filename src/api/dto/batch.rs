//! DTOs for batch shortening.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{BatchItem, BatchResult};
use crate::utils::url_validator::validate_http_url;

/// One element of the `POST /api/shorten/batch` request array.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchRequestItem {
    #[validate(length(min = 1, message = "correlation_id must not be empty"))]
    pub correlation_id: String,

    #[validate(custom(function = "validate_http_url"))]
    pub original_url: String,
}

impl From<BatchRequestItem> for BatchItem {
    fn from(item: BatchRequestItem) -> Self {
        BatchItem::new(item.correlation_id, item.original_url)
    }
}

/// One element of the batch response array.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchResponseItem {
    pub correlation_id: String,
    pub short_url: String,
}

impl From<BatchResult> for BatchResponseItem {
    fn from(result: BatchResult) -> Self {
        Self {
            correlation_id: result.correlation_id,
            short_url: result.short_url,
        }
    }
}
