//! Fast cache contract.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;

/// An expiring key-value cache.
///
/// Callers check [`FastCache::is_ready`] before every command and treat a
/// not-ready cache the same as a miss.
#[async_trait]
pub trait FastCache: Send + Sync {
    /// Whether the backend is currently worth talking to.
    fn is_ready(&self) -> bool;

    /// Returns the value stored under `key`, if any and not expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Round-trips a no-op command to check connectivity.
    async fn ping(&self) -> CacheResult<()>;

    /// Short backend name for diagnostics.
    fn backend_name(&self) -> &'static str;
}

/// Outcome of a cache read.
///
/// `Unavailable` covers both a not-ready backend and a failed command; the
/// accessor handles it exactly like `Miss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(String),
    Miss,
    Unavailable,
}
