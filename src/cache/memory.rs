//! In-Process Cache Module
//!
//! HashMap-backed cache with per-entry TTL. Expired entries are invisible to
//! reads and removed by the background sweeper or when room is needed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheEntry, FastCache};
use crate::error::{CacheError, CacheResult};

// == Memory Cache ==
/// In-process fast cache.
///
/// Availability can be switched off to make every command fail the way an
/// unreachable remote cache would.
#[derive(Debug)]
pub struct MemoryCache {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Whether commands are currently accepted
    available: AtomicBool,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates an available cache holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
            available: AtomicBool::new(true),
        }
    }

    /// Creates a cache that is never ready, so every read goes to the store.
    pub fn disabled() -> Self {
        let cache = Self::new(0);
        cache.set_available(false);
        cache
    }

    // == Availability ==
    /// Switches the cache on or off.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> CacheResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable)
        }
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl FastCache for MemoryCache {
    fn is_ready(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.ensure_available()?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.ensure_available()?;
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            entries.retain(|_, entry| !entry.is_expired());
            if entries.len() >= self.max_entries {
                return Err(CacheError::CacheFull(format!(
                    "limit of {} entries reached",
                    self.max_entries
                )));
            }
        }

        entries.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.ensure_available()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> CacheResult<()> {
        self.ensure_available()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_cache_new() {
        let cache = MemoryCache::new(100);
        assert_eq!(cache.len().await, 0);
        assert!(cache.is_empty().await);
        assert!(cache.is_ready());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(100);

        cache.set("key1", "value1", TTL).await.unwrap();
        let value = cache.get("key1").await.unwrap();

        assert_eq!(value.as_deref(), Some("value1"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(100);
        assert_eq!(cache.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(100);

        cache.set("key1", "value1", TTL).await.unwrap();
        cache.del("key1").await.unwrap();

        assert!(cache.is_empty().await);
        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let cache = MemoryCache::new(100);
        assert!(cache.del("nonexistent").await.is_ok());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let cache = MemoryCache::new(100);

        cache.set("key1", "value1", TTL).await.unwrap();
        cache.set("key1", "value2", TTL).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap().as_deref(), Some("value2"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(100);

        cache
            .set("key1", "value1", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(cache.get("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::new(100);

        cache
            .set("key1", "value1", Duration::from_millis(50))
            .await
            .unwrap();
        cache.set("key2", "value2", TTL).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("key2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_full_cache_rejects_new_keys() {
        let cache = MemoryCache::new(2);

        cache.set("key1", "v", TTL).await.unwrap();
        cache.set("key2", "v", TTL).await.unwrap();

        let result = cache.set("key3", "v", TTL).await;
        assert!(matches!(result, Err(CacheError::CacheFull(_))));

        // Overwrites still fit
        cache.set("key1", "v2", TTL).await.unwrap();
    }

    #[tokio::test]
    async fn test_full_cache_makes_room_from_expired() {
        let cache = MemoryCache::new(1);

        cache
            .set("key1", "v", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        cache.set("key2", "v", TTL).await.unwrap();
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_unavailable_rejects_commands() {
        let cache = MemoryCache::new(100);
        cache.set("key1", "value1", TTL).await.unwrap();

        cache.set_available(false);
        assert!(!cache.is_ready());
        assert_eq!(cache.get("key1").await, Err(CacheError::Unavailable));
        assert_eq!(cache.ping().await, Err(CacheError::Unavailable));

        cache.set_available(true);
        assert_eq!(cache.get("key1").await.unwrap().as_deref(), Some("value1"));
    }

    #[tokio::test]
    async fn test_disabled_cache() {
        let cache = MemoryCache::disabled();
        assert!(!cache.is_ready());
        assert!(cache.set("key", "v", TTL).await.is_err());
    }
}
