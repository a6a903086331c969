//! PostgreSQL implementation of TransactionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use market_core::entities::Transaction;
use market_core::error::DomainError;
use market_core::traits::{RepoResult, TransactionRepository};
use market_core::value_objects::{Page, PageRequest, Snowflake};

use crate::mappers::map_rows;
use crate::models::TransactionModel;

use super::error::map_db_error;

pub(crate) const TRANSACTION_COLUMNS: &str =
    "t.id, t.item_id, t.buyer_id, t.status, t.occurred_at, t.created_at, t.updated_at";

/// PostgreSQL implementation of TransactionRepository
#[derive(Clone)]
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    /// Create a new PgTransactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count and fetch one page for a `FROM ... WHERE ...` clause binding `$1`
    async fn page_where(
        &self,
        from_where: &str,
        arg: Option<i64>,
        page: PageRequest,
    ) -> RepoResult<Page<Transaction>> {
        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {from_where}"))
            .bind(arg)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, TransactionModel>(&format!(
            "SELECT {TRANSACTION_COLUMNS} {from_where} \
             ORDER BY t.created_at DESC, t.id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(arg)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(map_rows(rows)?, total, page))
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Transaction>> {
        let result = sqlx::query_as::<_, TransactionModel>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE t.id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Transaction::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_buyer(&self, buyer_id: Snowflake, page: PageRequest) -> RepoResult<Page<Transaction>> {
        self.page_where(
            "FROM transactions t WHERE t.buyer_id = $1",
            Some(buyer_id.into_inner()),
            page,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_by_seller(&self, seller_id: Snowflake, page: PageRequest) -> RepoResult<Page<Transaction>> {
        self.page_where(
            "FROM transactions t JOIN items i ON i.id = t.item_id WHERE i.owner_id = $1",
            Some(seller_id.into_inner()),
            page,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_all(&self, page: PageRequest) -> RepoResult<Page<Transaction>> {
        self.page_where("FROM transactions t WHERE $1::BIGINT IS NULL", None, page)
            .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TransactionNotFound(id));
        }

        Ok(())
    }
}
