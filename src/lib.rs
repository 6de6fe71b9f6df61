//! Items Cache - CRUD service over a relational store with a read-through cache
//!
//! Reads are served from a fast expiring cache when possible and fall back to
//! the durable store; writes go to the store and then invalidate the cache.

pub mod accessor;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use accessor::{CacheAside, CachePolicy};
pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
