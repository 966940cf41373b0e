//! Repository trait for shortened URL storage.

use std::collections::HashMap;

use crate::domain::entities::UserUrl;
use crate::error::StorageError;
use async_trait::async_trait;

/// Storage backend for shortened URLs.
///
/// All three backends (memory, file, PostgreSQL) implement this trait and
/// the service only ever holds it as `Arc<dyn UrlRepository>`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - volatile map
/// - [`crate::infrastructure::persistence::FileUrlRepository`] - JSON file snapshot
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Stores a live record.
    ///
    /// Returns `Ok(false)` when the ID is already taken, live or deleted. The
    /// existing record is kept unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    async fn save(
        &self,
        short_id: &str,
        original_url: &str,
        user_id: &str,
    ) -> Result<bool, StorageError>;

    /// Stores every `short_id -> original_url` pair for `user_id`.
    ///
    /// Applied atomically: either every pair is stored or none is. Returns
    /// the IDs that are already taken; when that list is non-empty nothing
    /// was written.
    async fn save_batch(
        &self,
        items: &HashMap<String, String>,
        user_id: &str,
    ) -> Result<Vec<String>, StorageError>;

    /// Resolves a short ID.
    ///
    /// Returns `None` both for unknown and for deleted IDs.
    async fn get(&self, short_id: &str) -> Option<String>;

    /// Finds the live short ID for an original URL, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on backend failure. A missing URL is `Ok(None)`.
    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<String>, StorageError>;

    /// Lists live records owned by `user_id` with bare short IDs in
    /// [`UserUrl::short_url`]. Order is unspecified.
    async fn get_urls_by_user_id(&self, user_id: &str) -> Result<Vec<UserUrl>, StorageError>;

    /// Marks the listed IDs deleted where they are owned by `user_id`.
    ///
    /// IDs owned by someone else, or unknown, are skipped without error.
    async fn delete_urls(&self, short_ids: &[String], user_id: &str) -> Result<(), StorageError>;

    /// Checks connectivity.
    ///
    /// Backends without a connection return [`StorageError::PingNotSupported`].
    async fn ping(&self) -> Result<(), StorageError>;

    /// Releases the backend at shutdown.
    ///
    /// File storage writes pending changes; PostgreSQL closes its pool.
    async fn close(&self) -> Result<(), StorageError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}
