//! Cache-Aside Accessor
//!
//! Mediates every item read and write between the durable store and the fast
//! cache:
//! - reads try the cache first, fall back to the store, then populate the cache
//! - writes go to the store, then delete the affected cache keys
//!
//! A cache that is not ready or that errors is treated as a miss on reads and
//! skipped on writes. Only store errors fail an operation.
//!
//! Invalidation happens after the store commit, so a reader racing a writer
//! can still see the old entry until the delete lands or the TTL lapses.

mod stats;


use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{item_key, CacheLookup, FastCache, COLLECTION_KEY};
use crate::error::StoreResult;
use crate::models::{Item, ItemPatch, NewItem};
use crate::store::ItemStore;

pub use stats::{AccessorStats, StatsSnapshot};

// == Cache Policy ==
/// Expiry and sizing knobs for the accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Lifetime of the cached listing
    pub collection_ttl: Duration,
    /// Lifetime of a cached single item
    pub item_ttl: Duration,
    /// Maximum number of items a listing returns
    pub list_limit: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            collection_ttl: Duration::from_secs(60),
            item_ttl: Duration::from_secs(300),
            list_limit: 100,
        }
    }
}

// == Cache-Aside Accessor ==
/// Read-through, invalidate-on-write access to items.
///
/// Holds no locks; the two collaborators are shared handles safe for
/// concurrent use.
pub struct CacheAside {
    store: Arc<dyn ItemStore>,
    cache: Arc<dyn FastCache>,
    policy: CachePolicy,
    stats: AccessorStats,
}

impl CacheAside {
    pub fn new(store: Arc<dyn ItemStore>, cache: Arc<dyn FastCache>, policy: CachePolicy) -> Self {
        Self {
            store,
            cache,
            policy,
            stats: AccessorStats::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn FastCache> {
        &self.cache
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // == Reads ==

    /// Returns the most recent items, newest first, bounded by the list limit.
    pub async fn fetch_collection(&self) -> StoreResult<Vec<Item>> {
        if let Some(items) = self.cached::<Vec<Item>>(COLLECTION_KEY).await {
            return Ok(items);
        }

        let items = self.store.list_recent(self.policy.list_limit).await?;
        self.stats.record_store_read();
        self.populate(COLLECTION_KEY, &items, self.policy.collection_ttl)
            .await;
        Ok(items)
    }

    /// Returns one item, or `None` if the store has no such id.
    ///
    /// Not-found results are never cached.
    pub async fn fetch_one(&self, id: i64) -> StoreResult<Option<Item>> {
        let key = item_key(id);
        if let Some(item) = self.cached::<Item>(&key).await {
            return Ok(Some(item));
        }

        let item = self.store.get(id).await?;
        self.stats.record_store_read();
        if let Some(item) = &item {
            self.populate(&key, item, self.policy.item_ttl).await;
        }
        Ok(item)
    }

    // == Writes ==

    /// Inserts an item and drops the cached listing.
    pub async fn create(&self, item: &NewItem) -> StoreResult<Item> {
        let created = self.store.insert(item).await?;
        self.invalidate_collection().await;
        Ok(created)
    }

    /// Applies a partial update. Returns `None` if the item does not exist.
    pub async fn update(&self, id: i64, patch: &ItemPatch) -> StoreResult<Option<Item>> {
        let updated = self.store.update(id, patch).await?;
        if updated.is_some() {
            self.invalidate_one(id).await;
            self.invalidate_collection().await;
        }
        Ok(updated)
    }

    /// Deletes an item. Returns `false` if it did not exist.
    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            self.invalidate_one(id).await;
            self.invalidate_collection().await;
        }
        Ok(deleted)
    }

    // == Invalidation ==

    /// Drops the cached copy of one item. Best effort.
    pub async fn invalidate_one(&self, id: i64) {
        self.evict(&item_key(id)).await;
    }

    /// Drops the cached listing. Best effort.
    pub async fn invalidate_collection(&self) {
        self.evict(COLLECTION_KEY).await;
    }

    // == Cache plumbing ==

    /// Reads `key` from the cache, folding errors and not-ready into `Unavailable`.
    pub async fn lookup(&self, key: &str) -> CacheLookup {
        if !self.cache.is_ready() {
            return CacheLookup::Unavailable;
        }

        match self.cache.get(key).await {
            Ok(Some(payload)) => CacheLookup::Hit(payload),
            Ok(None) => CacheLookup::Miss,
            Err(err) => {
                warn!("Cache read for '{}' failed, using store: {}", key, err);
                CacheLookup::Unavailable
            }
        }
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup(key).await {
            CacheLookup::Hit(payload) => match serde_json::from_str(&payload) {
                Ok(value) => {
                    debug!("Cache hit for '{}'", key);
                    self.stats.record_hit();
                    Some(value)
                }
                Err(err) => {
                    warn!("Discarding undecodable cache entry '{}': {}", key, err);
                    self.stats.record_miss();
                    None
                }
            },
            CacheLookup::Miss => {
                debug!("Cache miss for '{}'", key);
                self.stats.record_miss();
                None
            }
            CacheLookup::Unavailable => {
                self.stats.record_unavailable();
                None
            }
        }
    }

    async fn populate<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        if !self.cache.is_ready() {
            return;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Could not serialize '{}' for caching: {}", key, err);
                return;
            }
        };

        if let Err(err) = self.cache.set(key, &payload, ttl).await {
            warn!("Cache write for '{}' failed: {}", key, err);
        }
    }

    async fn evict(&self, key: &str) {
        if !self.cache.is_ready() {
            debug!("Cache not ready, skipping invalidation of '{}'", key);
            return;
        }

        match self.cache.del(key).await {
            Ok(()) => self.stats.record_invalidation(),
            Err(err) => warn!("Cache invalidation of '{}' failed: {}", key, err),
        }
    }
}
