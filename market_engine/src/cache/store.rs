use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

/// Exact-key string storage with optional expiry. Implementations must make `delete` idempotent.
///
/// The cache is a derived, disposable view: callers treat every error from this trait as a miss,
/// so a flushed or unreachable store only makes the system slower, never wrong.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// `ttl = None` stores the value without expiry (used for version counters).
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process store. The default when no cache URL is configured, and the store the tests run on.
///
/// Version bumps orphan old list keys, so expired entries must actually be reclaimed: reads evict
/// the entry they find expired, and every write sweeps whatever else has lapsed. Without that the
/// map grows without bound.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn live(deadline: &Option<Instant>, now: Instant) -> bool {
    deadline.map_or(true, |d| d > now)
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, deadline)) if live(deadline, now) => return Ok(Some(value.clone())),
                None => return Ok(None),
                Some(_) => {},
            }
        }
        // The entry has expired; drop it rather than leave a dead value behind
        let mut entries = self.entries.write().await;
        if let Some((_, deadline)) = entries.get(key) {
            if !live(deadline, now) {
                entries.remove(key);
            }
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Instant::now();
        let deadline = ttl.map(|ttl| now + ttl);
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, deadline)| live(deadline, now));
        entries.insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryCacheStore::new();
        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        // Deleting a missing key is not an error
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent_and_are_evicted() {
        let store = MemoryCacheStore::new();
        store.set("k", "v", Some(Duration::from_millis(10))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.entries.read().await.len(), 0);
    }

    #[tokio::test]
    async fn writes_sweep_out_lapsed_entries() {
        let store = MemoryCacheStore::new();
        for i in 0..10 {
            store.set(&format!("old:{i}"), "v", Some(Duration::from_millis(5))).await.unwrap();
        }
        store.set("keep", "v", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        // The next write reclaims everything that has expired, never-expiring keys aside
        store.set("fresh", "v", Some(Duration::from_secs(60))).await.unwrap();
        let entries = store.entries.read().await;
        assert_eq!(entries.len(), 2);
        assert!(entries.contains_key("keep"));
        assert!(entries.contains_key("fresh"));
    }
}
