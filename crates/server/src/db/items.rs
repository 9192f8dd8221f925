//! Pantry item repository backed by `PostgreSQL`.
//!
//! Queries use the runtime-checked `sqlx::query_as` API so the crate builds
//! without a live database or an offline query cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pantry_core::{ItemName, NewPantryItem, PantryItem, PantryItemId, UserId};

use super::{PantryStore, RepositoryError};

/// Row shape of `pantry_item`.
#[derive(Debug, sqlx::FromRow)]
struct PantryItemRow {
    id: PantryItemId,
    user_id: String,
    name: String,
    date_added: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PantryItemRow> for PantryItem {
    type Error = RepositoryError;

    fn try_from(row: PantryItemRow) -> Result<Self, Self::Error> {
        let name = ItemName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid item name in database: {e}"))
        })?;
        let user_id = UserId::parse(&row.user_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid user id in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name,
            date_added: row.date_added,
            created_at: row.created_at,
            user_id,
        })
    }
}

/// Repository for pantry item database operations.
#[derive(Clone)]
pub struct PgPantryStore {
    pool: PgPool,
}

impl PgPantryStore {
    /// Create a new pantry item repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PantryStore for PgPantryStore {
    async fn list(&self, user_id: &UserId) -> Result<Vec<PantryItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, PantryItemRow>(
            r"
            SELECT id, user_id, name, date_added, created_at
            FROM pantry_item
            WHERE user_id = $1
            ORDER BY date_added DESC, created_at DESC
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PantryItem::try_from).collect()
    }

    async fn create(&self, item: NewPantryItem) -> Result<PantryItem, RepositoryError> {
        let row = sqlx::query_as::<_, PantryItemRow>(
            r"
            INSERT INTO pantry_item (id, user_id, name, date_added, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, date_added, created_at
            ",
        )
        .bind(PantryItemId::new())
        .bind(item.user_id.as_str())
        .bind(item.name.as_str())
        .bind(item.date_added)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await?;

        PantryItem::try_from(row)
    }

    async fn delete(&self, id: PantryItemId) -> Result<PantryItem, RepositoryError> {
        let row = sqlx::query_as::<_, PantryItemRow>(
            r"
            DELETE FROM pantry_item
            WHERE id = $1
            RETURNING id, user_id, name, date_added, created_at
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)
            .and_then(PantryItem::try_from)
    }

    async fn clear_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM pantry_item")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM pantry_item WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
