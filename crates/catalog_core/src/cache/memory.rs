//! In-process cache backend on `moka`.

use super::{CacheResult, CacheStore};
use log::debug;
use moka::sync::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedEntry {
    payload: Arc<str>,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, CachedEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-memory cache with per-entry TTL.
///
/// Clones share the same underlying storage.
#[derive(Clone)]
pub struct MemoryCacheStore {
    inner: Cache<String, CachedEntry>,
    default_ttl: Duration,
}

impl MemoryCacheStore {
    pub fn new(max_capacity: u64, default_ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();
        Self { inner, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self
            .inner
            .get(key)
            .map(|entry| entry.payload.as_ref().to_owned()))
    }

    fn set(&self, key: &str, value: String) -> CacheResult<()> {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        debug!(
            "event=cache_set module=cache status=ok bytes={} ttl_secs={}",
            value.len(),
            ttl.as_secs()
        );
        self.inner.insert(
            key.to_owned(),
            CachedEntry {
                payload: Arc::from(value),
                ttl,
            },
        );
        Ok(())
    }
}
