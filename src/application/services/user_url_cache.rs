//! Per-user read-through cache of listed URLs.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::UserUrl;

/// Snapshot cache keyed by user ID, guarded by a single reader-writer lock.
///
/// Entries are only ever removed, never patched. Invalidating a user bumps
/// that user's generation; a snapshot fetched before the bump is refused by
/// [`UserUrlCache::store`] so it cannot outlive the write that made it stale.
/// Writes by one user never affect another user's pending snapshot.
#[derive(Debug, Default)]
pub struct UserUrlCache {
    inner: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, Vec<UserUrl>>,
    generations: HashMap<String, u64>,
}

impl CacheState {
    fn generation(&self, user_id: &str) -> u64 {
        self.generations.get(user_id).copied().unwrap_or(0)
    }
}

/// Token returned by [`UserUrlCache::lookup`] on a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket(u64);

impl UserUrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot, or a ticket to store a fresh one.
    pub async fn lookup(&self, user_id: &str) -> Result<Vec<UserUrl>, CacheTicket> {
        let state = self.inner.read().await;
        match state.entries.get(user_id) {
            Some(urls) => Ok(urls.clone()),
            None => Err(CacheTicket(state.generation(user_id))),
        }
    }

    /// Stores a snapshot fetched after `ticket` was issued.
    ///
    /// Returns false if the user was invalidated in between; the snapshot is
    /// dropped and the next lookup misses again.
    pub async fn store(&self, user_id: &str, ticket: CacheTicket, urls: Vec<UserUrl>) -> bool {
        let mut state = self.inner.write().await;
        if state.generation(user_id) != ticket.0 {
            return false;
        }
        state.entries.insert(user_id.to_string(), urls);
        true
    }

    /// Removes the user's snapshot.
    pub async fn invalidate(&self, user_id: &str) {
        let mut state = self.inner.write().await;
        state.entries.remove(user_id);
        let generation = state.generations.entry(user_id.to_string()).or_insert(0);
        *generation = generation.wrapping_add(1);
    }

    #[cfg(test)]
    pub async fn contains(&self, user_id: &str) -> bool {
        self.inner.read().await.entries.contains_key(user_id)
    }
}
