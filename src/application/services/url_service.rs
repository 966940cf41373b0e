//! URL shortening service.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::delete_pipeline::{DEFAULT_DELETE_WORKERS, DeletePipeline};
use super::user_url_cache::UserUrlCache;
use crate::domain::entities::{BatchItem, BatchResult, ShortenResult, UserUrl};
use crate::domain::repositories::UrlRepository;
use crate::error::{ServiceError, StorageError};
use crate::utils::code_generator::ShortIdGenerator;

/// Attempts to find a free short ID before giving up.
const MAX_ATTEMPTS: usize = 10;

/// Orchestrates ID generation, storage and the per-user listing cache.
///
/// Holds the storage backend only through [`UrlRepository`], so the same
/// service runs over PostgreSQL, file or memory storage. Cloning is cheap and
/// clones share the cache.
#[derive(Clone)]
pub struct UrlService {
    repository: Arc<dyn UrlRepository>,
    generator: Arc<dyn ShortIdGenerator>,
    base_url: String,
    cache: Arc<UserUrlCache>,
    delete_pipeline: DeletePipeline,
}

impl UrlService {
    /// Creates a service with the default number of delete workers.
    ///
    /// `base_url` is prepended verbatim to every short ID and must not end with
    /// a slash.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        generator: Arc<dyn ShortIdGenerator>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_delete_workers(repository, generator, base_url, DEFAULT_DELETE_WORKERS)
    }

    pub fn with_delete_workers(
        repository: Arc<dyn UrlRepository>,
        generator: Arc<dyn ShortIdGenerator>,
        base_url: impl Into<String>,
        delete_workers: usize,
    ) -> Self {
        Self {
            delete_pipeline: DeletePipeline::new(repository.clone(), delete_workers),
            repository,
            generator,
            base_url: base_url.into(),
            cache: Arc::new(UserUrlCache::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }

    /// Builds the externally visible short URL for `short_id`.
    pub fn short_url(&self, short_id: &str) -> String {
        format!("{}/{}", self.base_url, short_id)
    }

    /// Shortens `original_url` on behalf of `user_id`.
    ///
    /// # Deduplication
    ///
    /// If any user already has a live short ID for the exact same URL, that ID
    /// is returned with `is_new == false` and nothing is written.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Lookup`] if the duplicate check fails. The URL is not
    ///   shortened in that case.
    /// - [`ServiceError::Generation`] if the generator yields an empty ID.
    /// - [`ServiceError::IdsExhausted`] if every generated ID was already
    ///   taken.
    /// - [`ServiceError::Persist`] if the record cannot be saved.
    pub async fn shorten(
        &self,
        original_url: &str,
        user_id: &str,
    ) -> Result<ShortenResult, ServiceError> {
        let existing = self
            .repository
            .find_by_original_url(original_url)
            .await
            .map_err(|source| ServiceError::Lookup {
                url: original_url.to_string(),
                source,
            })?;

        if let Some(short_id) = existing {
            debug!(short_id = %short_id, "URL already shortened");
            metrics::counter!("shortener_dedup_hits_total").increment(1);
            return Ok(ShortenResult {
                short_url: self.short_url(&short_id),
                is_new: false,
            });
        }

        self.cache.invalidate(user_id).await;

        let short_id = self.save_with_fresh_id(original_url, user_id).await?;

        // a listing that started between the first invalidation and the save
        // may have cached the pre-write snapshot
        self.cache.invalidate(user_id).await;

        metrics::counter!("shortener_urls_created_total").increment(1);
        info!(short_id = %short_id, user_id, "URL shortened");

        Ok(ShortenResult {
            short_url: self.short_url(&short_id),
            is_new: true,
        })
    }

    /// Shortens every item in one storage write.
    ///
    /// Each item always gets a fresh ID, duplicates included. Results come
    /// back in input order, each carrying the correlation ID of its item.
    /// IDs already taken in storage are regenerated and the write retried.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Generation`] if the generator yields an empty ID.
    /// - [`ServiceError::IdsExhausted`] when no free ID can be found for an
    ///   item, within the batch or in storage.
    /// - [`ServiceError::PersistBatch`] if the batch cannot be saved. Nothing
    ///   is reported as saved in that case.
    pub async fn shorten_batch(
        &self,
        items: &[BatchItem],
        user_id: &str,
    ) -> Result<Vec<BatchResult>, ServiceError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch: HashMap<String, String> = HashMap::with_capacity(items.len());
        let mut assigned: Vec<String> = Vec::with_capacity(items.len());

        for item in items {
            let short_id = self.next_batch_id(&batch)?;
            batch.insert(short_id.clone(), item.original_url.clone());
            assigned.push(short_id);
        }

        self.cache.invalidate(user_id).await;

        let mut attempt = 1;
        loop {
            let taken = self
                .repository
                .save_batch(&batch, user_id)
                .await
                .map_err(|source| ServiceError::PersistBatch {
                    count: batch.len(),
                    source,
                })?;

            if taken.is_empty() {
                break;
            }
            if attempt == MAX_ATTEMPTS {
                return Err(ServiceError::IdsExhausted {
                    attempts: MAX_ATTEMPTS,
                });
            }
            attempt += 1;

            debug!(count = taken.len(), "Batch IDs already taken, regenerating");
            for old_id in taken {
                let Some(original_url) = batch.remove(&old_id) else {
                    continue;
                };
                let new_id = self.next_batch_id(&batch)?;
                batch.insert(new_id.clone(), original_url);
                if let Some(slot) = assigned.iter_mut().find(|id| **id == old_id) {
                    *slot = new_id;
                }
            }
        }

        self.cache.invalidate(user_id).await;

        metrics::counter!("shortener_urls_created_total").increment(batch.len() as u64);
        info!(count = batch.len(), user_id, "Batch shortened");

        Ok(items
            .iter()
            .zip(assigned)
            .map(|(item, short_id)| BatchResult {
                correlation_id: item.correlation_id.clone(),
                short_url: self.short_url(&short_id),
            })
            .collect())
    }

    /// Resolves a short ID to its original URL.
    ///
    /// Returns `None` for unknown and deleted IDs alike.
    pub async fn get(&self, short_id: &str) -> Option<String> {
        self.repository.get(short_id).await
    }

    /// Lists the live URLs owned by `user_id`, with full short URLs.
    ///
    /// Served from the per-user cache when present. A miss fetches from
    /// storage and caches the result until the user's next write.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Fetch`] if storage cannot be read. Nothing is
    /// cached in that case.
    pub async fn get_urls_by_user_id(&self, user_id: &str) -> Result<Vec<UserUrl>, ServiceError> {
        let ticket = match self.cache.lookup(user_id).await {
            Ok(urls) => {
                metrics::counter!("shortener_user_cache_hits_total").increment(1);
                return Ok(urls);
            }
            Err(ticket) => ticket,
        };

        let urls: Vec<UserUrl> = self
            .repository
            .get_urls_by_user_id(user_id)
            .await
            .map_err(|source| ServiceError::Fetch {
                user_id: user_id.to_string(),
                source,
            })?
            .into_iter()
            .map(|url| UserUrl {
                short_url: self.short_url(&url.short_url),
                original_url: url.original_url,
            })
            .collect();

        if !self.cache.store(user_id, ticket, urls.clone()).await {
            debug!(user_id, "User URLs changed during fetch, not caching");
        }

        Ok(urls)
    }

    /// Soft-deletes `short_ids` owned by `user_id`.
    ///
    /// Returns once every ID has been handed to the delete workers. The
    /// deletions themselves finish in the background and keep running if the
    /// returned future is dropped. IDs the user does not own are skipped
    /// silently, and per-ID failures are logged rather than returned.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DeletePipeline`] only if dispatching stopped
    /// before every ID was handed out.
    pub async fn delete_urls(
        &self,
        short_ids: Vec<String>,
        user_id: &str,
    ) -> Result<(), ServiceError> {
        self.cache.invalidate(user_id).await;

        let job = self.delete_pipeline.submit(short_ids, user_id.to_string());
        let (dispatched, finished) = job.dispatched().await?;

        let cache = self.cache.clone();
        let user = user_id.to_string();
        tokio::spawn(async move {
            if finished.await.is_ok() {
                cache.invalidate(&user).await;
            }
        });

        debug!(count = dispatched, user_id, "Deletion dispatched");
        Ok(())
    }

    /// Checks storage connectivity.
    ///
    /// Memory and file storage answer with [`StorageError::PingNotSupported`].
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.repository.ping().await
    }

    fn next_id(&self) -> Result<String, ServiceError> {
        let short_id = self.generator.generate();
        if short_id.is_empty() {
            return Err(ServiceError::Generation);
        }
        Ok(short_id)
    }

    /// Generates IDs until storage accepts one, up to [`MAX_ATTEMPTS`].
    async fn save_with_fresh_id(
        &self,
        original_url: &str,
        user_id: &str,
    ) -> Result<String, ServiceError> {
        for _ in 0..MAX_ATTEMPTS {
            let short_id = self.next_id()?;

            let inserted = self
                .repository
                .save(&short_id, original_url, user_id)
                .await
                .map_err(|source| ServiceError::Persist {
                    short_id: short_id.clone(),
                    url: original_url.to_string(),
                    source,
                })?;

            if inserted {
                return Ok(short_id);
            }
            debug!(short_id = %short_id, "Short ID already taken, regenerating");
        }

        Err(ServiceError::IdsExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    fn next_batch_id(&self, batch: &HashMap<String, String>) -> Result<String, ServiceError> {
        for _ in 0..MAX_ATTEMPTS {
            let short_id = self.next_id()?;
            if !batch.contains_key(&short_id) {
                return Ok(short_id);
            }
        }

        Err(ServiceError::IdsExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::persistence::MemoryUrlRepository;
    use crate::utils::code_generator::{MockShortIdGenerator, RandomShortIdGenerator};
    use std::sync::Mutex;
    use std::time::Duration;

    const BASE: &str = "http://x";

    fn memory_service() -> (UrlService, Arc<MemoryUrlRepository>) {
        let repo = Arc::new(MemoryUrlRepository::new());
        let service = UrlService::new(
            repo.clone(),
            Arc::new(RandomShortIdGenerator::with_seed(8, 42)),
            BASE,
        );
        (service, repo)
    }

    fn fixed_generator(id: &'static str) -> Arc<MockShortIdGenerator> {
        let mut generator = MockShortIdGenerator::new();
        generator.expect_generate().returning(move || id.to_string());
        Arc::new(generator)
    }

    fn sequence_generator(ids: &[&str]) -> Arc<MockShortIdGenerator> {
        let ids = Mutex::new(
            ids.iter()
                .rev()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        );
        let mut generator = MockShortIdGenerator::new();
        generator
            .expect_generate()
            .returning(move || ids.lock().unwrap().pop().unwrap_or_default());
        Arc::new(generator)
    }

    fn storage_failure() -> StorageError {
        StorageError::Io(std::io::Error::other("storage down"))
    }

    async fn wait_until_gone(service: &UrlService, short_id: &str) {
        for _ in 0..100 {
            if service.get(short_id).await.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{short_id} was not deleted");
    }

    #[tokio::test]
    async fn test_shorten_concrete_scenario() {
        let service = UrlService::new(
            Arc::new(MemoryUrlRepository::new()),
            fixed_generator("abc12345"),
            BASE,
        );

        let first = service.shorten("https://example.com", "u1").await.unwrap();
        assert_eq!(
            first,
            ShortenResult {
                short_url: "http://x/abc12345".to_string(),
                is_new: true
            }
        );

        let second = service.shorten("https://example.com", "u2").await.unwrap();
        assert_eq!(
            second,
            ShortenResult {
                short_url: "http://x/abc12345".to_string(),
                is_new: false
            }
        );

        assert_eq!(
            service.get("abc12345").await.as_deref(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn test_dedup_is_global() {
        let (service, _) = memory_service();

        let first = service.shorten("https://rust-lang.org", "alice").await.unwrap();
        let second = service.shorten("https://rust-lang.org", "bob").await.unwrap();

        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(first.short_url, second.short_url);
        assert!(first.short_url.starts_with("http://x/"));
    }

    #[tokio::test]
    async fn test_dedup_lookup_failure_is_surfaced() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Err(storage_failure()));
        repo.expect_save().never();

        let mut generator = MockShortIdGenerator::new();
        generator.expect_generate().never();

        let service = UrlService::new(Arc::new(repo), Arc::new(generator), BASE);
        let result = service.shorten("https://example.com", "u1").await;

        assert!(matches!(result, Err(ServiceError::Lookup { .. })));
    }

    #[tokio::test]
    async fn test_empty_id_fails_fast() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_save().never();

        let service = UrlService::new(Arc::new(repo), fixed_generator(""), BASE);
        let result = service.shorten("https://example.com", "u1").await;

        assert!(matches!(result, Err(ServiceError::Generation)));
    }

    #[tokio::test]
    async fn test_save_failure_carries_context() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url().returning(|_| Ok(None));
        repo.expect_save()
            .withf(|id, url, user| id == "abc12345" && url == "https://example.com" && user == "u1")
            .times(1)
            .returning(|_, _, _| Err(storage_failure()));

        let service = UrlService::new(Arc::new(repo), fixed_generator("abc12345"), BASE);
        let err = service
            .shorten("https://example.com", "u1")
            .await
            .unwrap_err();

        match err {
            ServiceError::Persist { short_id, url, .. } => {
                assert_eq!(short_id, "abc12345");
                assert_eq!(url, "https://example.com");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_taken_id_is_regenerated() {
        let service = UrlService::new(
            Arc::new(MemoryUrlRepository::new()),
            sequence_generator(&["same0000", "same0000", "fresh000"]),
            BASE,
        );

        let a = service.shorten("https://a.com", "u1").await.unwrap();
        let b = service.shorten("https://b.com", "u2").await.unwrap();

        assert_eq!(a.short_url, "http://x/same0000");
        assert_eq!(
            b,
            ShortenResult {
                short_url: "http://x/fresh000".to_string(),
                is_new: true
            }
        );
        assert_eq!(service.get("same0000").await.as_deref(), Some("https://a.com"));
        assert_eq!(service.get("fresh000").await.as_deref(), Some("https://b.com"));
    }

    #[tokio::test]
    async fn test_always_taken_id_gives_up() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url().returning(|_| Ok(None));
        repo.expect_save()
            .times(MAX_ATTEMPTS)
            .returning(|_, _, _| Ok(false));

        let service = UrlService::new(Arc::new(repo), fixed_generator("same0000"), BASE);
        let result = service.shorten("https://b.com", "u2").await;

        assert!(matches!(
            result,
            Err(ServiceError::IdsExhausted {
                attempts: MAX_ATTEMPTS
            })
        ));
    }

    #[tokio::test]
    async fn test_listing_cached_despite_other_users_write() {
        let (service, _) = memory_service();
        service.shorten("https://a.com", "u1").await.unwrap();

        // u1's fetch is in flight while u2 writes
        let ticket = service.cache.lookup("u1").await.unwrap_err();
        service.shorten("https://b.com", "u2").await.unwrap();

        let urls = vec![UserUrl {
            short_url: "http://x/abc".to_string(),
            original_url: "https://a.com".to_string(),
        }];
        assert!(service.cache.store("u1", ticket, urls.clone()).await);
        assert_eq!(service.get_urls_by_user_id("u1").await.unwrap(), urls);
    }

    #[tokio::test]
    async fn test_shorten_invalidates_user_cache() {
        let (service, _) = memory_service();

        service.shorten("https://one.com", "u1").await.unwrap();
        assert_eq!(service.get_urls_by_user_id("u1").await.unwrap().len(), 1);

        service.shorten("https://two.com", "u1").await.unwrap();
        let urls = service.get_urls_by_user_id("u1").await.unwrap();

        assert_eq!(urls.len(), 2);
        assert!(urls.iter().any(|u| u.original_url == "https://two.com"));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cache_empty() {
        let mut repo = MockUrlRepository::new();
        repo.expect_get_urls_by_user_id()
            .times(2)
            .returning(|_| Ok(Vec::new()));
        repo.expect_find_by_original_url().returning(|_| Ok(None));
        repo.expect_save().returning(|_, _, _| Err(storage_failure()));

        let service = UrlService::new(Arc::new(repo), fixed_generator("abc12345"), BASE);

        service.get_urls_by_user_id("u1").await.unwrap();
        assert!(service.shorten("https://a.com", "u1").await.is_err());

        // second fetch reaches storage again
        service.get_urls_by_user_id("u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_listing_is_cached_until_write() {
        let mut repo = MockUrlRepository::new();
        repo.expect_get_urls_by_user_id()
            .withf(|user| user == "u1")
            .times(1)
            .returning(|_| {
                Ok(vec![UserUrl {
                    short_url: "abc12345".to_string(),
                    original_url: "https://example.com".to_string(),
                }])
            });

        let mut generator = MockShortIdGenerator::new();
        generator.expect_generate().never();

        let service = UrlService::new(Arc::new(repo), Arc::new(generator), BASE);

        let first = service.get_urls_by_user_id("u1").await.unwrap();
        let second = service.get_urls_by_user_id("u1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].short_url, "http://x/abc12345");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_cached() {
        let mut repo = MockUrlRepository::new();
        let mut calls = 0;
        repo.expect_get_urls_by_user_id().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(storage_failure())
            } else {
                Ok(Vec::new())
            }
        });

        let service = UrlService::new(Arc::new(repo), fixed_generator("x"), BASE);

        assert!(matches!(
            service.get_urls_by_user_id("u1").await,
            Err(ServiceError::Fetch { .. })
        ));
        assert!(service.get_urls_by_user_id("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_preserves_correlation_with_duplicate_urls() {
        let (service, _) = memory_service();
        let items = vec![
            BatchItem::new("c1", "https://same.com"),
            BatchItem::new("c2", "https://same.com"),
            BatchItem::new("c3", "https://other.com"),
        ];

        let results = service.shorten_batch(&items, "u1").await.unwrap();

        assert_eq!(results.len(), 3);
        for (item, result) in items.iter().zip(&results) {
            assert_eq!(result.correlation_id, item.correlation_id);
            let id = result.short_url.strip_prefix("http://x/").unwrap();
            assert_eq!(service.get(id).await.as_deref(), Some(item.original_url.as_str()));
        }
        assert_ne!(results[0].short_url, results[1].short_url);
    }

    #[tokio::test]
    async fn test_batch_regenerates_colliding_ids() {
        let (_, repo) = memory_service();
        let service = UrlService::new(
            repo,
            sequence_generator(&["aaaa", "aaaa", "bbbb"]),
            BASE,
        );

        let results = service
            .shorten_batch(
                &[
                    BatchItem::new("c1", "https://a.com"),
                    BatchItem::new("c2", "https://b.com"),
                ],
                "u1",
            )
            .await
            .unwrap();

        assert_eq!(results[0].short_url, "http://x/aaaa");
        assert_eq!(results[1].short_url, "http://x/bbbb");
        assert_eq!(service.get("bbbb").await.as_deref(), Some("https://b.com"));
    }

    #[tokio::test]
    async fn test_batch_regenerates_ids_taken_in_storage() {
        let service = UrlService::new(
            Arc::new(MemoryUrlRepository::new()),
            sequence_generator(&["same0000", "same0000", "other000", "fresh000"]),
            BASE,
        );
        service.shorten("https://a.com", "u1").await.unwrap();

        let results = service
            .shorten_batch(
                &[
                    BatchItem::new("c1", "https://b.com"),
                    BatchItem::new("c2", "https://c.com"),
                ],
                "u2",
            )
            .await
            .unwrap();

        assert_eq!(results[0].correlation_id, "c1");
        assert_eq!(results[0].short_url, "http://x/fresh000");
        assert_eq!(results[1].short_url, "http://x/other000");
        assert_eq!(service.get("same0000").await.as_deref(), Some("https://a.com"));
        assert_eq!(service.get("fresh000").await.as_deref(), Some("https://b.com"));
        assert_eq!(service.get("other000").await.as_deref(), Some("https://c.com"));
    }

    #[tokio::test]
    async fn test_batch_persist_failure() {
        let mut repo = MockUrlRepository::new();
        repo.expect_save_batch()
            .withf(|items, user| items.len() == 2 && user == "u1")
            .times(1)
            .returning(|_, _| Err(storage_failure()));

        let service = UrlService::new(
            Arc::new(repo),
            sequence_generator(&["id1", "id2"]),
            BASE,
        );

        let result = service
            .shorten_batch(
                &[
                    BatchItem::new("c1", "https://a.com"),
                    BatchItem::new("c2", "https://b.com"),
                ],
                "u1",
            )
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::PersistBatch { count: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_batch_invalidates_user_cache() {
        let (service, _) = memory_service();
        assert!(service.get_urls_by_user_id("u1").await.unwrap().is_empty());

        service
            .shorten_batch(&[BatchItem::new("c1", "https://a.com")], "u1")
            .await
            .unwrap();

        assert_eq!(service.get_urls_by_user_id("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_writes_nothing() {
        let mut repo = MockUrlRepository::new();
        repo.expect_save_batch().never();

        let service = UrlService::new(Arc::new(repo), fixed_generator("x"), BASE);
        assert!(service.shorten_batch(&[], "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_respects_ownership() {
        let service = UrlService::new(
            Arc::new(MemoryUrlRepository::new()),
            fixed_generator("abc12345"),
            BASE,
        );
        service.shorten("https://example.com", "alice").await.unwrap();

        service
            .delete_urls(vec!["abc12345".to_string()], "bob")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            service.get("abc12345").await.as_deref(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn test_deleted_id_is_indistinguishable_from_unknown() {
        let service = UrlService::new(
            Arc::new(MemoryUrlRepository::new()),
            fixed_generator("abc12345"),
            BASE,
        );
        service.shorten("https://example.com", "u1").await.unwrap();

        service
            .delete_urls(vec!["abc12345".to_string()], "u1")
            .await
            .unwrap();
        wait_until_gone(&service, "abc12345").await;

        assert_eq!(service.get("abc12345").await, service.get("never").await);
    }

    #[tokio::test]
    async fn test_deleted_url_can_be_shortened_again() {
        let service = UrlService::new(
            Arc::new(MemoryUrlRepository::new()),
            sequence_generator(&["first", "second"]),
            BASE,
        );

        service.shorten("https://example.com", "u1").await.unwrap();
        service
            .delete_urls(vec!["first".to_string()], "u1")
            .await
            .unwrap();
        wait_until_gone(&service, "first").await;

        let again = service.shorten("https://example.com", "u1").await.unwrap();
        assert_eq!(again.short_url, "http://x/second");
        assert!(again.is_new);
    }

    #[tokio::test]
    async fn test_delete_refreshes_listing_after_completion() {
        let (service, _) = memory_service();
        let created = service.shorten("https://a.com", "u1").await.unwrap();
        service.shorten("https://b.com", "u1").await.unwrap();
        let id = created.short_url.strip_prefix("http://x/").unwrap().to_string();

        assert_eq!(service.get_urls_by_user_id("u1").await.unwrap().len(), 2);

        service.delete_urls(vec![id.clone()], "u1").await.unwrap();
        wait_until_gone(&service, &id).await;

        let mut remaining = Vec::new();
        for _ in 0..100 {
            remaining = service.get_urls_by_user_id("u1").await.unwrap();
            if remaining.len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].original_url, "https://b.com");
    }

    #[tokio::test]
    async fn test_ping_forwards_backend_result() {
        let (service, _) = memory_service();
        assert!(service.ping().await.unwrap_err().is_ping_not_supported());

        let mut repo = MockUrlRepository::new();
        repo.expect_ping().times(1).returning(|| Ok(()));
        let service = UrlService::new(Arc::new(repo), fixed_generator("x"), BASE);
        assert!(service.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_shortens_from_many_users() {
        let (service, _) = memory_service();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .shorten(&format!("https://site{i}.com"), &format!("user{}", i % 4))
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_new);
        }

        for user in 0..4 {
            let urls = service
                .get_urls_by_user_id(&format!("user{user}"))
                .await
                .unwrap();
            assert_eq!(urls.len(), 4);
        }
    }
}
