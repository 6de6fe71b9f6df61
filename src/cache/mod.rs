//! Fast Cache Module
//!
//! Expiring key-value backends consulted before the durable store.
//!
//! # Backends
//! - [`MemoryCache`]: in-process TTL map, swept by a background task
//! - [`RedisCache`]: Redis over a lazily established connection manager

mod backend;
mod entry;
mod keys;
mod memory;
mod redis_cache;

// Re-export public types
pub use backend::{CacheLookup, FastCache};
pub use entry::CacheEntry;
pub use keys::{item_key, COLLECTION_KEY};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
