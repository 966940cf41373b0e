//! Shortened URL entities.

use serde::{Deserialize, Serialize};

/// A stored mapping from a short ID to an original URL.
///
/// `short_id` is the primary key. Single-URL shortening reuses the live record
/// for an `original_url` when one is found, but the lookup and the insert are
/// separate steps, so two concurrent requests for the same new URL can both
/// create records. Batch shortening always mints fresh IDs. A deleted
/// record's URL may be shortened again under a new ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    #[serde(rename = "short_url")]
    pub short_id: String,
    pub original_url: String,
    #[serde(rename = "user_id")]
    pub owner_user_id: String,
    #[serde(rename = "is_deleted", default)]
    pub deleted: bool,
}

impl UrlRecord {
    /// Creates a live record owned by `owner_user_id`.
    pub fn new(
        short_id: impl Into<String>,
        original_url: impl Into<String>,
        owner_user_id: impl Into<String>,
    ) -> Self {
        Self {
            short_id: short_id.into(),
            original_url: original_url.into(),
            owner_user_id: owner_user_id.into(),
            deleted: false,
        }
    }

    /// Returns true if the record has not been soft-deleted.
    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// Projects the record into its user-facing view.
    pub fn to_user_url(&self) -> UserUrl {
        UserUrl {
            short_url: self.short_id.clone(),
            original_url: self.original_url.clone(),
        }
    }
}

/// Outcome of shortening a single URL.
///
/// `is_new == false` means the URL already had a live short ID (created by
/// any user) and that ID was returned instead of minting a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenResult {
    pub short_url: String,
    pub is_new: bool,
}

/// A user's shortened URL as exposed to that user.
///
/// Backends return the bare short ID in `short_url`; the service rewrites it
/// to the full `base_url/short_id` form before handing it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

/// One entry of a batch shortening request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: String,
}

impl BatchItem {
    pub fn new(correlation_id: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            original_url: original_url.into(),
        }
    }
}

/// Result for one [`BatchItem`], keyed by the caller's correlation ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub correlation_id: String,
    pub short_url: String,
}
