//! Volatile in-memory URL repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::url_table::UrlTable;
use crate::domain::entities::UserUrl;
use crate::domain::repositories::UrlRepository;
use crate::error::StorageError;

/// Repository keeping all records in a process-local map.
///
/// Construction cannot fail, which makes it the last step of the storage
/// fallback chain. Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryUrlRepository {
    table: RwLock<UrlTable>,
}

impl MemoryUrlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        debug!("Using in-memory URL storage");
        Self::default()
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn save(
        &self,
        short_id: &str,
        original_url: &str,
        user_id: &str,
    ) -> Result<bool, StorageError> {
        let inserted = self
            .table
            .write()
            .await
            .insert(short_id, original_url, user_id);

        if !inserted {
            debug!(short_id, "Short ID already taken, save skipped");
        }
        Ok(inserted)
    }

    async fn save_batch(
        &self,
        items: &HashMap<String, String>,
        user_id: &str,
    ) -> Result<Vec<String>, StorageError> {
        Ok(self.table.write().await.insert_batch(items, user_id))
    }

    async fn get(&self, short_id: &str) -> Option<String> {
        self.table.read().await.get_live(short_id)
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<String>, StorageError> {
        Ok(self.table.read().await.find_live_by_url(original_url))
    }

    async fn get_urls_by_user_id(&self, user_id: &str) -> Result<Vec<UserUrl>, StorageError> {
        Ok(self.table.read().await.live_for_user(user_id))
    }

    async fn delete_urls(&self, short_ids: &[String], user_id: &str) -> Result<(), StorageError> {
        self.table.write().await.mark_deleted(short_ids, user_id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Err(StorageError::PingNotSupported { backend: "memory" })
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
