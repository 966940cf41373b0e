//! Bounded fan-out pipeline for soft-deleting URLs.
//!
//! A submission starts a fixed number of workers that pull IDs from a shared
//! task channel and delete them one at a time. Per-ID outcomes go to a result
//! channel drained by a supervisor task that logs failures.
//!
//! All tasks are detached from the caller: dropping a [`DeleteJob`] (or the
//! future awaiting it) stops waiting but never stops deletions in flight.

use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, warn};

use crate::domain::repositories::UrlRepository;
use crate::error::{ServiceError, StorageError};

/// Default number of concurrent delete workers.
pub const DEFAULT_DELETE_WORKERS: usize = 4;

/// Summary of a finished deletion job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    pub attempted: usize,
    pub failed: usize,
}

struct DeleteOutcome {
    short_id: String,
    result: Result<(), StorageError>,
}

/// Handle to a submitted deletion job.
pub struct DeleteJob {
    dispatched: oneshot::Receiver<usize>,
    finished: oneshot::Receiver<DeleteReport>,
}

impl DeleteJob {
    /// Waits until every ID has been handed to a worker.
    ///
    /// Returns the number of IDs dispatched together with a receiver for the
    /// final report.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DeletePipeline`] if the dispatcher stopped early.
    pub async fn dispatched(self) -> Result<(usize, oneshot::Receiver<DeleteReport>), ServiceError> {
        let count = self
            .dispatched
            .await
            .map_err(|_| ServiceError::DeletePipeline)?;
        Ok((count, self.finished))
    }

    /// Waits until every dispatched ID has been processed.
    pub async fn finished(self) -> Result<DeleteReport, ServiceError> {
        self.finished.await.map_err(|_| ServiceError::DeletePipeline)
    }
}

/// Dispatches deletions to a capped pool of workers.
#[derive(Clone)]
pub struct DeletePipeline {
    repository: Arc<dyn UrlRepository>,
    workers: usize,
}

impl DeletePipeline {
    /// Creates a pipeline running at most `workers` deletions at once.
    pub fn new(repository: Arc<dyn UrlRepository>, workers: usize) -> Self {
        Self {
            repository,
            workers: workers.max(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn workers(&self) -> usize {
        self.workers
    }

    /// Starts deleting `short_ids` on behalf of `user_id`.
    ///
    /// Returns immediately; the work runs on spawned tasks.
    pub fn submit(&self, short_ids: Vec<String>, user_id: String) -> DeleteJob {
        let (dispatched_tx, dispatched_rx) = oneshot::channel();
        let (finished_tx, finished_rx) = oneshot::channel();

        let (task_tx, task_rx) = mpsc::channel::<String>(self.workers);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<DeleteOutcome>(self.workers);

        let pool_size = self.workers.min(short_ids.len()).max(1);
        let user_id = Arc::<str>::from(user_id);

        for _ in 0..pool_size {
            let repository = self.repository.clone();
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let user_id = user_id.clone();

            tokio::spawn(async move {
                loop {
                    let next = task_rx.lock().await.recv().await;
                    let Some(short_id) = next else { break };

                    let result = repository
                        .delete_urls(std::slice::from_ref(&short_id), &user_id)
                        .await;

                    if result_tx
                        .send(DeleteOutcome { short_id, result })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        tokio::spawn(async move {
            let mut sent = 0;
            for short_id in short_ids {
                if task_tx.send(short_id).await.is_err() {
                    break;
                }
                sent += 1;
            }
            drop(task_tx);
            let _ = dispatched_tx.send(sent);
        });

        let supervisor_user = user_id.clone();
        tokio::spawn(async move {
            let mut report = DeleteReport::default();

            while let Some(outcome) = result_rx.recv().await {
                report.attempted += 1;
                if let Err(e) = outcome.result {
                    report.failed += 1;
                    metrics::counter!("shortener_delete_failures_total").increment(1);
                    warn!(
                        short_id = %outcome.short_id,
                        user_id = %supervisor_user,
                        error = %e,
                        "Failed to delete URL"
                    );
                }
            }

            debug!(
                user_id = %supervisor_user,
                attempted = report.attempted,
                failed = report.failed,
                "Delete job finished"
            );
            let _ = finished_tx.send(report);
        });

        DeleteJob {
            dispatched: dispatched_rx,
            finished: finished_rx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::persistence::MemoryUrlRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_deletes_all_owned_ids() {
        let repo = Arc::new(MemoryUrlRepository::new());
        for i in 0..20 {
            repo.save(&format!("id{i}"), &format!("https://s{i}.com"), "u1")
                .await
                .unwrap();
        }

        let pipeline = DeletePipeline::new(repo.clone(), 4);
        let ids = (0..20).map(|i| format!("id{i}")).collect();

        let report = pipeline
            .submit(ids, "u1".to_string())
            .finished()
            .await
            .unwrap();

        assert_eq!(report.attempted, 20);
        assert_eq!(report.failed, 0);
        assert!(repo.get_urls_by_user_id("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_propagated() {
        let mut mock = MockUrlRepository::new();
        mock.expect_delete_urls().times(3).returning(|ids, _| {
            if ids[0] == "bad" {
                Err(StorageError::Io(std::io::Error::other("disk full")))
            } else {
                Ok(())
            }
        });

        let pipeline = DeletePipeline::new(Arc::new(mock), 2);
        let ids = vec!["a".to_string(), "bad".to_string(), "b".to_string()];

        let report = pipeline
            .submit(ids, "u1".to_string())
            .finished()
            .await
            .unwrap();

        assert_eq!(
            report,
            DeleteReport {
                attempted: 3,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut mock = MockUrlRepository::new();
        {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            mock.expect_delete_urls().times(30).returning(move |_, _| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(2));
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let pipeline = DeletePipeline::new(Arc::new(mock), 3);
        let ids = (0..30).map(|i| format!("id{i}")).collect();

        let report = pipeline
            .submit(ids, "u1".to_string())
            .finished()
            .await
            .unwrap();

        assert_eq!(report.attempted, 30);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_dispatch_completes_before_finish() {
        let repo = Arc::new(MemoryUrlRepository::new());
        let pipeline = DeletePipeline::new(repo, 2);

        let job = pipeline.submit(vec!["x".to_string(), "y".to_string()], "u1".to_string());
        let (dispatched, finished) = job.dispatched().await.unwrap();

        assert_eq!(dispatched, 2);
        assert_eq!(finished.await.unwrap().attempted, 2);
    }

    #[tokio::test]
    async fn test_empty_submission() {
        let pipeline = DeletePipeline::new(Arc::new(MemoryUrlRepository::new()), 4);

        let report = pipeline
            .submit(Vec::new(), "u1".to_string())
            .finished()
            .await
            .unwrap();

        assert_eq!(report, DeleteReport::default());
    }

    #[tokio::test]
    async fn test_zero_workers_is_clamped() {
        let pipeline = DeletePipeline::new(Arc::new(MemoryUrlRepository::new()), 0);
        assert_eq!(pipeline.workers(), 1);
    }
}
