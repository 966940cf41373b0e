//! Startup storage selection with a PostgreSQL → file → memory fallback chain.

use std::sync::Arc;
use tracing::{info, warn};

use super::{FileUrlRepository, MemoryUrlRepository, PgPoolSettings, PgUrlRepository};
use crate::domain::repositories::UrlRepository;

/// Picks the storage backend for the lifetime of the process.
///
/// # Priority
///
/// 1. PostgreSQL, if `sql_dsn` is non-empty and the connection and schema
///    setup succeed
/// 2. File storage, if `file_path` is non-empty and the file can be loaded or
///    created
/// 3. In-memory storage, which cannot fail
///
/// A failing backend is logged and skipped. There are no retries and the
/// choice is never re-evaluated.
pub async fn select_storage(
    sql_dsn: &str,
    file_path: &str,
    pg_settings: PgPoolSettings,
) -> Arc<dyn UrlRepository> {
    if !sql_dsn.is_empty() {
        match PgUrlRepository::connect(sql_dsn, pg_settings).await {
            Ok(repo) => {
                info!("Using PostgreSQL storage");
                return Arc::new(repo);
            }
            Err(e) => {
                warn!(error = %e, "PostgreSQL storage unavailable, falling back");
            }
        }
    }

    if !file_path.is_empty() {
        match FileUrlRepository::open(file_path).await {
            Ok(repo) => {
                info!(file = file_path, "Using file storage");
                return Arc::new(repo);
            }
            Err(e) => {
                warn!(file = file_path, error = %e, "File storage unavailable, falling back to memory");
            }
        }
    }

    info!("Using in-memory storage");
    Arc::new(MemoryUrlRepository::new())
}
