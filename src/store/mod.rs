//! Durable Store Module
//!
//! The authoritative home of item records. The accessor only depends on the
//! [`ItemStore`] trait; [`SqliteItemStore`] is the sqlx-backed implementation.

mod sqlite;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Item, ItemPatch, NewItem};

pub use sqlite::SqliteItemStore;

/// Operations the service needs from the durable store.
///
/// Every method is a single statement (plus an existence check for updates);
/// no transaction spans calls.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Checks that the store answers a trivial query.
    async fn ping(&self) -> StoreResult<()>;

    /// Returns at most `limit` items, most recently created first.
    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<Item>>;

    /// Looks up one item. `None` means it does not exist.
    async fn get(&self, id: i64) -> StoreResult<Option<Item>>;

    /// Inserts a new item and returns it with its assigned id and timestamps.
    async fn insert(&self, item: &NewItem) -> StoreResult<Item>;

    /// Applies a partial update. `None` means the item does not exist.
    async fn update(&self, id: i64, patch: &ItemPatch) -> StoreResult<Option<Item>>;

    /// Deletes an item. Returns `false` if nothing was deleted.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}
