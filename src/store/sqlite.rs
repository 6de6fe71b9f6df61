//! SQLite implementation of the item store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::ItemStore;
use crate::error::StoreResult;
use crate::models::item::now_utc;
use crate::models::{Item, ItemPatch, NewItem};

const ITEM_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Item store over a bounded sqlx connection pool.
#[derive(Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Opens a pool for `database_url`, creating the database file if needed.
    ///
    /// In-memory URLs get a single connection that is never recycled, since
    /// each SQLite memory connection is its own database.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(10));
        let pool_options = if database_url.contains(":memory:") {
            pool_options
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the `items` table and its index if they do not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL CHECK (length(name) <= 255),
                description TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_created_at ON items (created_at)")
            .execute(&self.pool)
            .await?;

        info!("Items table ready");
        Ok(())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Item>> {
        let item =
            sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(item)
    }

    async fn insert(&self, item: &NewItem) -> StoreResult<Item> {
        let now = now_utc();
        let created = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (name, description, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, id: i64, patch: &ItemPatch) -> StoreResult<Option<Item>> {
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };

        let (name, description) = patch.merge(&current);
        let updated_at = now_utc().max(current.updated_at);

        // A delete racing between the lookup and here yields no row.
        let updated = sqlx::query_as::<_, Item>(&format!(
            "UPDATE items SET name = ?, description = ?, updated_at = ? WHERE id = ? RETURNING {ITEM_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteItemStore {
        let store = SqliteItemStore::connect("sqlite::memory:", 1).await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    fn new_item(name: &str, description: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = memory_store().await;

        let created = store.insert(&new_item("widget", "small")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = memory_store().await;
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_orders_newest_first_and_limits() {
        let store = memory_store().await;
        for i in 0..5 {
            store
                .insert(&new_item(&format!("item-{i}"), "d"))
                .await
                .unwrap();
        }

        let items = store.list_recent(3).await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["item-4", "item-3", "item-2"]);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = memory_store().await;
        let created = store.insert(&new_item("widget", "small")).await.unwrap();

        let patch = ItemPatch {
            name: Some("gadget".to_string()),
            description: None,
        };
        let updated = store.update(created.id, &patch).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "gadget");
        assert_eq!(updated.description, "small");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = memory_store().await;
        let patch = ItemPatch {
            name: Some("x".to_string()),
            description: None,
        };
        assert!(store.update(99, &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = memory_store().await;
        let created = store.insert(&new_item("widget", "small")).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ping_and_schema_is_idempotent() {
        let store = memory_store().await;
        store.ensure_schema().await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_pool_reports_error() {
        let store = memory_store().await;
        store.close().await;
        assert!(store.ping().await.is_err());
    }
}
