//! In-memory copy of host records.
//!
//! The host stays the source of truth. The cache is filled by one full scan
//! and updated by this process's own writes; edits made elsewhere (for
//! example in the SiYuan editor) are not seen until the next [`EntityCache::load`].

use crate::error::Result;
use crate::host::{Host, Query};
use crate::mapper::Record;
use crate::types::SearchFilters;
use std::collections::HashMap;

/// Records that can be matched by free-text search and filters
pub trait Searchable {
    /// `needle` is already lowercased and non-empty
    fn matches_text(&self, needle: &str) -> bool;

    fn matches_filters(&self, filters: &SearchFilters) -> bool;
}

/// Outcome of a full scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

pub struct EntityCache<T: Record> {
    entries: HashMap<String, T>,
}

impl<T: Record> Default for EntityCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> EntityCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Replace the contents with every record `query` returns.
    /// Blocks that do not parse are logged and skipped; a failed query leaves the cache as it was.
    pub async fn load(&mut self, host: &dyn Host, query: &Query) -> Result<LoadReport> {
        let blocks = host.query(query).await.map_err(|e| {
            log::error!("Failed to load {} records: {}", T::KIND, e);
            e
        })?;
        log::debug!("Found {} {} documents", blocks.len(), T::KIND);

        let mut entries = HashMap::with_capacity(blocks.len());
        let mut report = LoadReport::default();

        for block in &blocks {
            match T::from_block(block) {
                Ok(record) => {
                    if let Some(previous) = entries.insert(record.key().to_string(), record) {
                        log::warn!(
                            "Duplicate {} id {} (block {}), keeping the later document",
                            T::KIND,
                            previous.key(),
                            block.id
                        );
                    }
                    report.loaded += 1;
                }
                Err(e) => {
                    log::warn!("Skipping unreadable {} document: {}", T::KIND, e);
                    report.skipped += 1;
                }
            }
        }

        self.entries = entries;
        Ok(report)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn upsert(&mut self, record: T) {
        self.entries.insert(record.key().to_string(), record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

}

impl<T: Record + Searchable> EntityCache<T> {
    /// Case-insensitive text match, then filters. An empty query matches everything.
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<&T> {
        let needle = query.trim().to_lowercase();

        self.entries
            .values()
            .filter(|record| needle.is_empty() || record.matches_text(&needle))
            .filter(|record| record.matches_filters(filters))
            .collect()
    }
}
