//! In-process record table shared by the memory and file repositories.
//!
//! Holds no lock of its own; callers wrap it in their own `RwLock`.

use std::collections::HashMap;

use crate::domain::entities::{UrlRecord, UserUrl};

#[derive(Debug, Default, Clone)]
pub(crate) struct UrlTable {
    records: HashMap<String, UrlRecord>,
}

impl UrlTable {
    pub(crate) fn from_records(records: impl IntoIterator<Item = UrlRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.short_id.clone(), r))
                .collect(),
        }
    }

    /// Inserts a record unless the ID is taken. Returns true if inserted.
    pub(crate) fn insert(&mut self, short_id: &str, original_url: &str, user_id: &str) -> bool {
        if self.records.contains_key(short_id) {
            return false;
        }

        self.records.insert(
            short_id.to_string(),
            UrlRecord::new(short_id, original_url, user_id),
        );
        true
    }

    /// Inserts every pair, or none if any ID is taken.
    ///
    /// Returns the taken IDs; an empty list means everything was inserted.
    pub(crate) fn insert_batch(
        &mut self,
        items: &HashMap<String, String>,
        user_id: &str,
    ) -> Vec<String> {
        let taken: Vec<String> = items
            .keys()
            .filter(|short_id| self.records.contains_key(short_id.as_str()))
            .cloned()
            .collect();

        if taken.is_empty() {
            for (short_id, original_url) in items {
                self.insert(short_id, original_url, user_id);
            }
        }
        taken
    }

    pub(crate) fn get_live(&self, short_id: &str) -> Option<String> {
        self.records
            .get(short_id)
            .filter(|r| r.is_live())
            .map(|r| r.original_url.clone())
    }

    pub(crate) fn find_live_by_url(&self, original_url: &str) -> Option<String> {
        self.records
            .values()
            .find(|r| r.is_live() && r.original_url == original_url)
            .map(|r| r.short_id.clone())
    }

    pub(crate) fn live_for_user(&self, user_id: &str) -> Vec<UserUrl> {
        self.records
            .values()
            .filter(|r| r.is_live() && r.owner_user_id == user_id)
            .map(UrlRecord::to_user_url)
            .collect()
    }

    /// Marks owned records deleted. Returns the number newly marked.
    pub(crate) fn mark_deleted(&mut self, short_ids: &[String], user_id: &str) -> usize {
        let mut marked = 0;
        for short_id in short_ids {
            if let Some(record) = self.records.get_mut(short_id)
                && record.owner_user_id == user_id
                && !record.deleted
            {
                record.deleted = true;
                marked += 1;
            }
        }
        marked
    }

    pub(crate) fn snapshot(&self) -> Vec<UrlRecord> {
        self.records.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
