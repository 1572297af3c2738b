// --- File: crates/calboard_calendly/src/cache.rs ---
//! Short-lived in-memory cache for aggregate results.
//!
//! Explicit interface per the aggregation design: `get`, `put` (TTL applied
//! on read), and `invalidate_all`, the latter driven by directory mutations
//! rather than TTL expiry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::models::AggregateEntry;

struct CacheSlot {
    stored_at: Instant,
    entries: Vec<AggregateEntry>,
}

/// TTL cache keyed by a string derived from the filter set.
#[derive(Clone)]
pub struct EventCache {
    inner: Arc<RwLock<HashMap<String, CacheSlot>>>,
    ttl: Duration,
}

impl EventCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the cached aggregate for `key` unless it has expired.
    pub fn get(&self, key: &str) -> Option<Vec<AggregateEntry>> {
        let guard = self.inner.read().ok()?;
        let slot = guard.get(key)?;
        if slot.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(slot.entries.clone())
    }

    /// Stores a fresh aggregate under `key`, resetting its TTL.
    pub fn put(&self, key: &str, entries: Vec<AggregateEntry>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.insert(
                key.to_string(),
                CacheSlot {
                    stored_at: Instant::now(),
                    entries,
                },
            );
        }
    }

    /// Drops every cached aggregate, independent of TTL. Called on any
    /// create/update/delete of a professional record.
    pub fn invalidate_all(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.clear();
        }
    }
}
