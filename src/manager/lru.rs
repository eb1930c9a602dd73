//! Bounded least-recently-used map.

use std::hash::Hash;

use indexmap::IndexMap;

/// A map holding at most `capacity` entries, ordered from least to most
/// recently used. Inserting or reading an entry makes it the most recent.
#[derive(Debug)]
pub struct LruCache<K, V> {
    entries: IndexMap<K, V>,
    capacity: usize,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Create an empty cache. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let (key, value) = self.entries.shift_remove_entry(key)?;
        let (index, _) = self.entries.insert_full(key, value);
        self.entries.get_index(index).map(|(_, value)| value)
    }

    /// Look up `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Insert or replace `key` as the most recent entry, evicting the
    /// least recently used entries to stay within capacity.
    ///
    /// Returns the evicted entries, oldest first.
    pub fn insert(&mut self, key: K, value: V) -> Vec<(K, V)> {
        self.entries.shift_remove(&key);
        let mut evicted = Vec::new();
        while self.entries.len() >= self.capacity {
            match self.entries.shift_remove_index(0) {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        self.entries.insert(key, value);
        evicted
    }

    /// Remove every entry whose key matches `predicate`. Returns how many
    /// were removed.
    pub fn remove_all(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !predicate(key));
        before - self.entries.len()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
