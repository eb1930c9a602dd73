//! Versioned parse cache.

use super::lru::LruCache;
use crate::base::{DocumentId, SnapshotId};

/// LRU cache of parse computations keyed by snapshot.
///
/// Publishing an entry for a snapshot makes every entry for the same or
/// an older version of that document unreachable, so a lookup can never
/// hand out a tree that a newer one has replaced. Entries of different
/// documents only compete for capacity.
#[derive(Debug)]
pub struct IncrementalParseCache<V> {
    entries: LruCache<SnapshotId, V>,
}

impl<V> IncrementalParseCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// The entry for `key`, marked most recently used.
    pub fn get(&mut self, key: &SnapshotId) -> Option<&V> {
        self.entries.get(key)
    }

    /// Publish `value` for `key`.
    ///
    /// Entries for versions of the same document up to and including
    /// `key`'s are dropped first; only then are least recently used
    /// entries evicted to make room.
    pub fn insert(&mut self, key: SnapshotId, value: V) {
        let superseded = self.entries.remove_all(|cached| cached.is_superseded_by(&key));
        let evicted = self.entries.insert(key, value);
        if superseded > 0 || !evicted.is_empty() {
            tracing::trace!(
                snapshot = %key,
                superseded,
                evicted = evicted.len(),
                "parse cache entries dropped"
            );
        }
    }

    /// Remove every entry whose key matches `predicate`.
    pub fn remove_all(&mut self, predicate: impl FnMut(&SnapshotId) -> bool) -> usize {
        self.entries.remove_all(predicate)
    }

    /// Remove every entry of `document`.
    pub fn remove_document(&mut self, document: DocumentId) -> usize {
        self.remove_all(|key| key.document == document)
    }

    /// Whether an entry for a newer version of `key`'s document exists.
    pub fn has_newer(&self, key: &SnapshotId) -> bool {
        self.entries.keys().any(|cached| key.precedes(cached))
    }

    /// Whether `key` is cached. Does not touch recency.
    pub fn contains(&self, key: &SnapshotId) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }
}
