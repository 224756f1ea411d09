//! PostgreSQL item store.

use crate::error::{ItemStoreError, ItemStoreResult};
use crate::models::{ItemFields, ItemFilter, ItemRow};
use crate::repos::ItemRepo;
use crate::store::ItemStore;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use time::OffsetDateTime;

const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

/// Split the schema into executable statements, dropping comment-only chunks.
fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .map(str::trim)
        .filter(|statement| {
            statement.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            })
        })
        .collect()
}

/// PostgreSQL-based item store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Connect using a connection URL and migrate.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> ItemStoreResult<Self> {
        let mut opts = PgConnectOptions::from_str(url)?;
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{timeout_ms}ms"))]);
            tracing::info!(timeout_ms, "PostgreSQL statement_timeout set");
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl ItemStore for PostgresStore {
    async fn migrate(&self) -> ItemStoreResult<()> {
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> ItemStoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ItemRepo for PostgresStore {
    async fn get_item(&self, id: i64) -> ItemStoreResult<Option<ItemRow>> {
        let row = sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_item(&self, id: i64) -> ItemStoreResult<ItemRow> {
        let now = OffsetDateTime::now_utc();
        sqlx::query(
            r#"
            INSERT INTO items (id, created_at, updated_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_item(id).await?.ok_or(ItemStoreError::NotFound(id))
    }

    async fn update_item_fields(&self, id: i64, fields: &ItemFields) -> ItemStoreResult<ItemRow> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items
            SET title = $1, url = $2, author = $3, score = $4, posted_at = $5,
                deleted = FALSE, updated_at = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.url)
        .bind(&fields.author)
        .bind(fields.score)
        .bind(fields.posted_at)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(ItemStoreError::NotFound(id))
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
                SELECT id FROM items ORDER BY created_at ASC, id ASC LIMIT $1
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
            WHERE ($1::BOOLEAN IS NULL OR is_top = $1)
              AND ($2 OR NOT deleted)
            ORDER BY id ASC
            LIMIT $3
            "#,
        )
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
            r#"
            UPDATE items SET is_top = TRUE, top_at = $1, updated_at = $1
            WHERE id = $2 AND top_at IS NULL
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if assigned.rows_affected() > 0 {
            return Ok(true);
        }

        let result = sqlx::query("UPDATE items SET is_top = TRUE, updated_at = $1 WHERE id = $2")
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
        let result = sqlx::query("UPDATE items SET deleted = TRUE, updated_at = $1 WHERE id = $2")
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
