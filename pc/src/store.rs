//! Core TtlCache implementation

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

/// A single cached value with its expiry deadline
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory key-value cache with per-entry TTL
///
/// Shared across concurrent pipeline invocations behind an `Arc`. Writes are
/// last-writer-wins; that is acceptable because entries for the same key are
/// derived from the same request signature.
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: RwLock<HashMap<String, Entry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given default TTL
    pub fn new(default_ttl: Duration) -> Self {
        debug!(?default_ttl, "TtlCache::new: called");
        Self {
            inner: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Look up a value; expired entries are removed and miss
    pub async fn get(&self, key: &str) -> Option<V> {
        debug!(%key, "TtlCache::get: called");
        let now = Instant::now();

        {
            let map = self.inner.read().await;
            match map.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!(%key, "TtlCache::get: hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {
                    debug!(%key, "TtlCache::get: entry expired");
                }
                None => {
                    debug!(%key, "TtlCache::get: miss");
                    return None;
                }
            }
        }

        // Expired: upgrade to a write lock and drop the stale entry
        let mut map = self.inner.write().await;
        if let Some(entry) = map.get(key)
            && entry.is_expired(now)
        {
            map.remove(key);
        }
        None
    }

    /// Insert a value with the default TTL
    pub async fn insert(&self, key: String, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl).await;
    }

    /// Insert a value with an explicit TTL
    pub async fn insert_with_ttl(&self, key: String, value: V, ttl: Duration) {
        debug!(%key, ?ttl, "TtlCache::insert_with_ttl: called");
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut map = self.inner.write().await;
        map.insert(key, entry);
    }

    /// Remove every expired entry, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        debug!("TtlCache::purge_expired: called");
        let now = Instant::now();
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired(now));
        let dropped = before - map.len();
        debug!(%dropped, "TtlCache::purge_expired: done");
        dropped
    }

    /// Number of entries currently held (including not-yet-purged expired ones)
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Drop all entries
    pub async fn clear(&self) {
        debug!("TtlCache::clear: called");
        self.inner.write().await.clear();
    }
}
