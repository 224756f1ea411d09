//! Item store trait and SQLite implementation.

use crate::error::{ItemStoreError, ItemStoreResult};
use crate::models::{ItemFields, ItemFilter, ItemRow};
use crate::repos::ItemRepo;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use time::OffsetDateTime;

/// Combined item store trait.
#[async_trait]
pub trait ItemStore: ItemRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> ItemStoreResult<()>;

    /// Check database connectivity.
    async fn health_check(&self) -> ItemStoreResult<()>;
}

/// SQLite-based item store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub async fn new(path: impl AsRef<Path>) -> ItemStoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // Single writer; avoids "database is locked" under concurrent requests.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!(path = %path.display(), "Opened SQLite item store");
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn migrate(&self) -> ItemStoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> ItemStoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ItemRepo for SqliteStore {
    async fn get_item(&self, id: i64) -> ItemStoreResult<Option<ItemRow>> {
        let row = sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_item(&self, id: i64) -> ItemStoreResult<ItemRow> {
        let now = OffsetDateTime::now_utc();
        sqlx::query(
            r#"
            INSERT INTO items (id, score, deleted, is_top, created_at, updated_at)
            VALUES (?, 0, 0, 0, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_item(id).await?.ok_or(ItemStoreError::NotFound(id))
    }

    async fn update_item_fields(&self, id: i64, fields: &ItemFields) -> ItemStoreResult<ItemRow> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET title = ?, url = ?, author = ?, score = ?, posted_at = ?, deleted = 0, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.url)
        .bind(&fields.author)
        .bind(fields.score)
        .bind(fields.posted_at)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ItemStoreError::NotFound(id));
        }
        self.get_item(id).await?.ok_or(ItemStoreError::NotFound(id))
    }

    async fn count_items(&self) -> ItemStoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn delete_oldest_items(&self, limit: u64) -> ItemStoreResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM items WHERE id IN (
                SELECT id FROM items ORDER BY created_at ASC, id ASC LIMIT ?
            )
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_items(&self, filter: &ItemFilter) -> ItemStoreResult<Vec<ItemRow>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT * FROM items
            WHERE (? IS NULL OR is_top = ?)
              AND (? OR deleted = 0)
            ORDER BY id ASC
            LIMIT ?
            "#,
        )
        .bind(filter.is_top)
        .bind(filter.is_top)
        .bind(filter.include_deleted)
        .bind(filter.limit_value())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_top(&self, id: i64, now: OffsetDateTime) -> ItemStoreResult<bool> {
        // Only the caller whose update sets top_at reports the item as newly ranked.
        let assigned = sqlx::query(
            "UPDATE items SET is_top = 1, top_at = ?, updated_at = ? WHERE id = ? AND top_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if assigned.rows_affected() > 0 {
            return Ok(true);
        }

        let result = sqlx::query("UPDATE items SET is_top = 1, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ItemStoreError::NotFound(id));
        }
        Ok(false)
    }

    async fn soft_delete_item(&self, id: i64) -> ItemStoreResult<bool> {
        let result = sqlx::query("UPDATE items SET deleted = 1, updated_at = ? WHERE id = ?")
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    title TEXT,
    url TEXT,
    author TEXT,
    score INTEGER NOT NULL DEFAULT 0,
    posted_at TEXT,
    deleted INTEGER NOT NULL DEFAULT 0,
    is_top INTEGER NOT NULL DEFAULT 0,
    top_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_items_created ON items(created_at, id);
CREATE INDEX IF NOT EXISTS idx_items_top ON items(is_top) WHERE is_top = 1;
"#;
