//! File-backed URL repository.
//!
//! Records live in memory and are periodically rewritten to a JSON array on
//! disk. Writes to the file happen on a background task after the in-memory
//! update, so a crash between a mutation and its flush loses that mutation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use super::url_table::UrlTable;
use crate::domain::entities::{UrlRecord, UserUrl};
use crate::domain::repositories::UrlRepository;
use crate::error::StorageError;

/// Repository persisting records to a JSON file.
///
/// # File format
///
/// ```json
/// [
///   { "short_url": "abc12345", "original_url": "https://example.com", "user_id": "u1", "is_deleted": false }
/// ]
/// ```
///
/// The file is replaced atomically (write to `<path>.tmp`, then rename).
/// Concurrent mutations coalesce: a flush that starts after several updates
/// writes them all at once, and only one flush runs at a time.
#[derive(Clone)]
pub struct FileUrlRepository {
    inner: Arc<FileState>,
}

struct FileState {
    path: PathBuf,
    table: RwLock<UrlTable>,
    dirty: AtomicBool,
    flush_lock: Mutex<()>,
}

impl FileUrlRepository {
    /// Opens the repository at `path`, loading existing records.
    ///
    /// A missing file is created with an empty array so that an unwritable
    /// location is detected at startup.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be read or created, and
    /// [`StorageError::Serialization`] if it holds malformed JSON.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice::<Vec<UrlRecord>>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(&path, b"[]").await?;
                info!(path = %path.display(), "Created empty storage file");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let table = UrlTable::from_records(records);
        info!(
            path = %path.display(),
            records = table.len(),
            "File storage loaded"
        );

        Ok(Self {
            inner: Arc::new(FileState {
                path,
                table: RwLock::new(table),
                dirty: AtomicBool::new(false),
                flush_lock: Mutex::new(()),
            }),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Writes pending changes to disk and waits for the write to finish.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the file write fails.
    pub async fn flush(&self) -> Result<(), StorageError> {
        self.inner.flush().await
    }

    fn schedule_flush(&self) {
        self.inner.dirty.store(true, Ordering::Release);

        let state = self.inner.clone();
        tokio::spawn(async move {
            if let Err(e) = state.flush().await {
                error!(path = %state.path.display(), error = %e, "Failed to flush storage file");
            }
        });
    }
}

impl FileState {
    async fn flush(&self) -> Result<(), StorageError> {
        let _guard = self.flush_lock.lock().await;

        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let mut records = self.table.read().await.snapshot();
        records.sort_by(|a, b| a.short_id.cmp(&b.short_id));

        if let Err(e) = self.write_records(&records).await {
            self.dirty.store(true, Ordering::Release);
            return Err(e);
        }

        debug!(path = %self.path.display(), records = records.len(), "Storage file flushed");
        Ok(())
    }

    async fn write_records(&self, records: &[UrlRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(records)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl UrlRepository for FileUrlRepository {
    async fn save(
        &self,
        short_id: &str,
        original_url: &str,
        user_id: &str,
    ) -> Result<bool, StorageError> {
        let inserted = self
            .inner
            .table
            .write()
            .await
            .insert(short_id, original_url, user_id);

        if inserted {
            self.schedule_flush();
        } else {
            debug!(short_id, "Short ID already taken, save skipped");
        }
        Ok(inserted)
    }

    async fn save_batch(
        &self,
        items: &HashMap<String, String>,
        user_id: &str,
    ) -> Result<Vec<String>, StorageError> {
        let taken = self.inner.table.write().await.insert_batch(items, user_id);

        if taken.is_empty() && !items.is_empty() {
            self.schedule_flush();
        }
        Ok(taken)
    }

    async fn get(&self, short_id: &str) -> Option<String> {
        self.inner.table.read().await.get_live(short_id)
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<String>, StorageError> {
        Ok(self.inner.table.read().await.find_live_by_url(original_url))
    }

    async fn get_urls_by_user_id(&self, user_id: &str) -> Result<Vec<UserUrl>, StorageError> {
        Ok(self.inner.table.read().await.live_for_user(user_id))
    }

    async fn delete_urls(&self, short_ids: &[String], user_id: &str) -> Result<(), StorageError> {
        let marked = self
            .inner
            .table
            .write()
            .await
            .mark_deleted(short_ids, user_id);

        if marked > 0 {
            self.schedule_flush();
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Err(StorageError::PingNotSupported { backend: "file" })
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.inner.flush().await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
