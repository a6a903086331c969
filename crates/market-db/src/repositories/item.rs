//! PostgreSQL implementation of ItemRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use market_core::entities::Item;
use market_core::error::DomainError;
use market_core::traits::{ItemQuery, ItemRepository, RepoResult};
use market_core::value_objects::{Availability, ItemStatus, Page, PageRequest, Snowflake};

use crate::mappers::{availability_from_row, map_rows};
use crate::models::{AvailabilityRow, ItemModel};

use super::error::{like_pattern, map_db_error};

pub(crate) const ITEM_COLUMNS: &str = "id, owner_id, title, price, category, description, \
     image_url, status, version, created_at, updated_at, deleted_at";

/// PostgreSQL implementation of ItemRepository
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    /// Create a new PgItemRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Item>> {
        let result = sqlx::query_as::<_, ItemModel>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Item::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_including_deleted(&self, id: Snowflake) -> RepoResult<Option<Item>> {
        sqlx::query_as::<_, ItemModel>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(Item::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &ItemQuery, page: PageRequest) -> RepoResult<Page<Item>> {
        let pattern = query.search.as_deref().and_then(like_pattern);
        let category = query.category.map(|c| c.as_str());

        let filter = r"
            WHERE deleted_at IS NULL
              AND status = $1
              AND ($2::TEXT IS NULL OR category = $2)
              AND ($3::TEXT IS NULL OR title ILIKE $3 OR description ILIKE $3)
        ";

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM items {filter}"))
            .bind(query.status.as_str())
            .bind(category)
            .bind(pattern.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, ItemModel>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items {filter} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(query.status.as_str())
        .bind(category)
        .bind(pattern.as_deref())
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(map_rows(rows)?, total, page))
    }

    #[instrument(skip(self))]
    async fn list_by_owner(&self, owner_id: Snowflake, page: PageRequest) -> RepoResult<Page<Item>> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM items WHERE owner_id = $1 AND deleted_at IS NULL",
        )
        .bind(owner_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, ItemModel>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(owner_id.into_inner())
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(map_rows(rows)?, total, page))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn create(&self, item: &Item) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO items (id, owner_id, title, price, category, description, image_url,
                               status, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(item.id.into_inner())
        .bind(item.owner_id.into_inner())
        .bind(&item.title)
        .bind(item.price)
        .bind(item.category.as_str())
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(item.status.as_str())
        .bind(item.version)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn update_details(&self, item: &Item) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE items
            SET title = $2, price = $3, category = $4, description = $5, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(item.id.into_inner())
        .bind(&item.title)
        .bind(item.price)
        .bind(item.category.as_str())
        .bind(&item.description)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ItemNotFound(item.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_image_url(&self, id: Snowflake, url: &str) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE items SET image_url = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.into_inner())
        .bind(url)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ItemNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn compare_and_set_status(
        &self,
        id: Snowflake,
        expected: Availability,
        next: ItemStatus,
    ) -> RepoResult<Availability> {
        let row = sqlx::query_as::<_, AvailabilityRow>(
            r"
            UPDATE items
            SET status = $4, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND status = $2 AND version = $3 AND deleted_at IS NULL
            RETURNING status, version
            ",
        )
        .bind(id.into_inner())
        .bind(expected.status.as_str())
        .bind(expected.version)
        .bind(next.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map_or_else(|| Err(DomainError::StaleItemVersion), availability_from_row)
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: Snowflake, expected: Availability) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE items
            SET status = 'removed', version = version + 1, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = $2 AND version = $3 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(expected.status.as_str())
        .bind(expected.version)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StaleItemVersion);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn hard_delete(&self, id: Snowflake) -> RepoResult<()> {
        // transactions and chats follow through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ItemNotFound(id));
        }

        Ok(())
    }
}
