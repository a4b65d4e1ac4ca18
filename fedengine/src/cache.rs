//! Time-boxed result cache
//!
//! Bounded in size and age. Eviction is by insertion order: once full, a new
//! key pushes out the entry that was inserted first, however often it was
//! read. Re-setting a key moves it to the back.

use crate::clock::Clock;
use fedsource::Track;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Normalized cache key
///
/// Parameter names are sorted, values trimmed and lower-cased, so the same
/// logical request always yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new<K, V>(operation: &str, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| {
                (
                    k.as_ref().trim().to_lowercase(),
                    v.as_ref().trim().to_lowercase(),
                )
            })
            .collect();
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        Self(format!("{}?{query}", operation.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Vec<Track>,
    stored_at_ms: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: IndexMap<CacheKey, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

#[derive(Debug)]
pub struct ResultCache {
    ttl_ms: u64,
    capacity: usize,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl ResultCache {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            capacity: capacity.max(1),
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_expired(&self, entry: &CacheEntry, now: u64) -> bool {
        now.saturating_sub(entry.stored_at_ms) >= self.ttl_ms
    }

    /// Cached payload, `None` when missing or expired
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Track>> {
        let now = self.clock.now_ms();
        let mut guard = self.lock();
        let inner = &mut *guard;
        let expired = match inner.entries.get(key) {
            Some(entry) if !self.is_expired(entry, now) => {
                let payload = entry.payload.clone();
                inner.hits += 1;
                return Some(payload);
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.entries.shift_remove(key);
            debug!(key = %key, "Cache entry expired");
        }
        inner.misses += 1;
        None
    }

    pub fn set(&self, key: CacheKey, payload: Vec<Track>) {
        let entry = CacheEntry {
            payload,
            stored_at_ms: self.clock.now_ms(),
        };
        let mut inner = self.lock();
        if inner.entries.shift_remove(&key).is_none() && inner.entries.len() >= self.capacity {
            if let Some((evicted, _)) = inner.entries.shift_remove_index(0) {
                debug!(key = %evicted, "Cache entry evicted");
            }
        }
        inner.entries.insert(key, entry);
    }

    /// Removes expired entries, returns how many were dropped
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !self.is_expired(entry, now));
        before - inner.entries.len()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let lookups = inner.hits + inner.misses;
        CacheStats {
            size: inner.entries.len(),
            capacity: self.capacity,
            hits: inner.hits,
            misses: inner.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                inner.hits as f64 / lookups as f64
            },
        }
    }

    /// Sweeps expired entries every `interval` until the cache is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    debug!("Cache dropped, sweeper exiting");
                    break;
                };
                let removed = cache.clear_expired();
                if removed > 0 {
                    info!(removed, remaining = cache.len(), "Cache sweep");
                }
            }
        })
    }
}
