//! # Read-through cache
//!
//! Every cached read in the system goes through [`MarketCache::get_or_set`]: check the store, on a
//! miss run the producer (a database query), store the result, and report where the value came
//! from so responses can be tagged `source: "cache" | "db"`.
//!
//! Invalidation is by *versioned keys*. Collection keys are built with [`MarketCache::scoped_key`],
//! which embeds a per-scope version counter; any write to the underlying entities calls
//! [`MarketCache::bump`] on the scope, making every previously issued collection key unreachable.
//! Single-entity keys are deleted exactly. There is no pattern/glob deletion anywhere.
//!
//! Store failures are logged and degrade to a miss (reads) or a no-op (writes); the store of
//! record stays authoritative.

pub mod keys;
mod redis_store;
mod store;

use std::{future::Future, sync::Arc, time::Duration};

use log::warn;
use serde::{de::DeserializeOwned, Serialize};

pub use redis_store::RedisCacheStore;
pub use store::{CacheError, CacheStore, MemoryCacheStore};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Where a cached read was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    Cache,
    Db,
}

impl std::fmt::Display for CacheSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheSource::Cache => write!(f, "cache"),
            CacheSource::Db => write!(f, "db"),
        }
    }
}

#[derive(Clone)]
pub struct MarketCache {
    store: Arc<dyn CacheStore>,
}

impl MarketCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()))
    }

    /// Fetch and deserialize. Absence, store failure and deserialization failure all read as
    /// `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("🗄️ Cache read for {key} failed, treating as miss. {e}");
                return None;
            },
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("🗄️ Cached value for {key} could not be deserialized, treating as miss. {e}");
                None
            },
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("🗄️ Could not serialize value for cache key {key}. {e}");
                return;
            },
        };
        if let Err(e) = self.store.set(key, &raw, Some(ttl)).await {
            warn!("🗄️ Cache write for {key} failed. {e}");
        }
    }

    /// Exact-key delete. Idempotent; failures are logged and swallowed.
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!("🗄️ Cache delete for {key} failed. {e}");
        }
    }

    /// The standard read path: cached value if present, otherwise run `producer`, store its
    /// result, and return it tagged with its source. Producer errors pass straight through and
    /// nothing is cached for them.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<(T, CacheSource), E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get_json::<T>(key).await {
            return Ok((value, CacheSource::Cache));
        }
        let value = producer().await?;
        self.set_json(key, &value, ttl).await;
        Ok((value, CacheSource::Db))
    }

    /// Build a collection key under `scope`, embedding the scope's current version.
    pub async fn scoped_key(&self, scope: &str, suffix: &str) -> String {
        let version = self.current_version(scope).await;
        format!("{scope}:v{version}:{suffix}")
    }

    /// Invalidate every collection key under `scope` by advancing its version counter.
    pub async fn bump(&self, scope: &str) {
        let next = self.current_version(scope).await + 1;
        if let Err(e) = self.store.set(&version_key(scope), &next.to_string(), None).await {
            warn!("🗄️ Could not bump cache version for scope {scope}. {e}");
        }
    }

    async fn current_version(&self, scope: &str) -> u64 {
        match self.store.get(&version_key(scope)).await {
            Ok(Some(raw)) => raw.parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!("🗄️ Cache version read for scope {scope} failed. {e}");
                0
            },
        }
    }
}

fn version_key(scope: &str) -> String {
    format!("ver:{scope}")
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn get_or_set_runs_producer_once() {
        let cache = MarketCache::in_memory();
        let calls = AtomicUsize::new(0);
        for expected in [CacheSource::Db, CacheSource::Cache] {
            let (value, source) = cache
                .get_or_set::<u32, CacheError, _, _>("answer", DEFAULT_CACHE_TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
            assert_eq!(source, expected);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn producer_errors_are_not_cached() {
        let cache = MarketCache::in_memory();
        let res = cache
            .get_or_set::<u32, String, _, _>("bad", DEFAULT_CACHE_TTL, || async { Err("boom".to_string()) })
            .await;
        assert_eq!(res.unwrap_err(), "boom");
        assert_eq!(cache.get_json::<u32>("bad").await, None);
    }

    #[tokio::test]
    async fn bump_makes_old_scoped_keys_unreachable() {
        let cache = MarketCache::in_memory();
        let key1 = cache.scoped_key("buyer_orders:7", "page:1").await;
        cache.set_json(&key1, &vec![1, 2, 3], DEFAULT_CACHE_TTL).await;
        cache.bump("buyer_orders:7").await;
        let key2 = cache.scoped_key("buyer_orders:7", "page:1").await;
        assert_ne!(key1, key2);
        assert_eq!(cache.get_json::<Vec<i32>>(&key2).await, None);
        // The old entry is still present but no reader will ever build its key again
        assert_eq!(cache.get_json::<Vec<i32>>(&key1).await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn corrupt_entries_read_as_absent() {
        let cache = MarketCache::in_memory();
        cache.store.set("weird", "{not json", Some(DEFAULT_CACHE_TTL)).await.unwrap();
        assert_eq!(cache.get_json::<Vec<i32>>("weird").await, None);
    }
}
