//! Time-expiring entity cache.
//!
//! Keyed by the entity's original action hash (as a stable string). An
//! expired entry behaves exactly like a missing one; the remote runtime stays
//! the source of truth.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::common::ActionHash;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct EntityCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> EntityCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or replace, restarting the entry's expiry.
    pub fn insert(&mut self, original: &ActionHash, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .insert(original.cache_key(), CacheEntry { value, expires_at });
    }

    /// Fresh value for `original`, if any.
    pub fn get(&self, original: &ActionHash) -> Option<&V> {
        let now = Instant::now();
        self.entries
            .get(&original.cache_key())
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| &entry.value)
    }

    /// Apply `f` to a fresh entry in place, keeping its expiry.
    ///
    /// Returns `false` when there is no fresh entry to update.
    pub fn update<F>(&mut self, original: &ActionHash, f: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        let now = Instant::now();
        match self.entries.get_mut(&original.cache_key()) {
            Some(entry) if entry.is_fresh(now) => {
                f(&mut entry.value);
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, original: &ActionHash) -> Option<V> {
        let now = Instant::now();
        self.entries
            .remove(&original.cache_key())
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before - self.entries.len()
    }

    /// Number of fresh entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.values().filter(|e| e.is_fresh(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
