//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::domain::entities::UserUrl;
use crate::domain::repositories::UrlRepository;
use crate::error::StorageError;

const INSERT_URL: &str = r#"
    INSERT INTO urls (short_id, original_url, user_id)
    VALUES ($1, $2, $3)
    ON CONFLICT (short_id) DO NOTHING
"#;

/// Connection pool settings for [`PgUrlRepository::connect`].
#[derive(Debug, Clone, Copy)]
pub struct PgPoolSettings {
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl Default for PgPoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// PostgreSQL repository for URL records.
///
/// Uses bound parameters for every query. The `urls` table is created by the
/// embedded migrations when missing.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a repository over an existing pool. Migrations are not run.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Connects to `dsn`, verifies the connection and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the database is unreachable within
    /// the configured timeout and [`StorageError::Migration`] if the schema
    /// cannot be created.
    pub async fn connect(dsn: &str, settings: PgPoolSettings) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.connect_timeout)
            .connect(dsn)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Connected to PostgreSQL, schema is up to date");
        Ok(Self::new(Arc::new(pool)))
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn save(
        &self,
        short_id: &str,
        original_url: &str,
        user_id: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(INSERT_URL)
            .bind(short_id)
            .bind(original_url)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn save_batch(
        &self,
        items: &HashMap<String, String>,
        user_id: &str,
    ) -> Result<Vec<String>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut taken = Vec::new();

        for (short_id, original_url) in items {
            let result = sqlx::query(INSERT_URL)
                .bind(short_id)
                .bind(original_url)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                taken.push(short_id.clone());
            }
        }

        if taken.is_empty() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(taken)
    }

    async fn get(&self, short_id: &str) -> Option<String> {
        let result = sqlx::query_scalar::<_, String>(
            "SELECT original_url FROM urls WHERE short_id = $1 AND is_deleted = FALSE",
        )
        .bind(short_id)
        .fetch_optional(self.pool.as_ref())
        .await;

        match result {
            Ok(url) => url,
            Err(e) => {
                error!(short_id, error = %e, "Failed to resolve short ID");
                None
            }
        }
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<String>, StorageError> {
        let short_id = sqlx::query_scalar::<_, String>(
            r#"
            SELECT short_id
            FROM urls
            WHERE original_url = $1 AND is_deleted = FALSE
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(short_id)
    }

    async fn get_urls_by_user_id(&self, user_id: &str) -> Result<Vec<UserUrl>, StorageError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT short_id, original_url
            FROM urls
            WHERE user_id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(short_url, original_url)| UserUrl {
                short_url,
                original_url,
            })
            .collect())
    }

    async fn delete_urls(&self, short_ids: &[String], user_id: &str) -> Result<(), StorageError> {
        if short_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE urls
            SET is_deleted = TRUE
            WHERE short_id = ANY($1) AND user_id = $2
            "#,
        )
        .bind(short_ids)
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
