//! PostgreSQL unit of work
//!
//! Wraps one `sqlx` transaction. Row locks taken with `FOR UPDATE` are held
//! until commit or rollback; dropping the unit of work rolls back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tracing::instrument;

use market_core::entities::{Item, Transaction, TransactionStatus};
use market_core::error::DomainError;
use market_core::traits::{RepoResult, UnitOfWork, UnitOfWorkFactory};
use market_core::value_objects::{Availability, ItemStatus, Snowflake};

use crate::mappers::availability_from_row;
use crate::models::{AvailabilityRow, ItemModel, TransactionModel};

use super::error::{is_violation_of, map_db_error, ONE_PENDING_PER_ITEM};
use super::item::ITEM_COLUMNS;
use super::transaction::TRANSACTION_COLUMNS;

/// Opens [`PgUnitOfWork`]s on a pool
#[derive(Clone)]
pub struct PgUnitOfWorkFactory {
    pool: PgPool,
}

impl PgUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PgUnitOfWorkFactory {
    async fn begin(&self) -> RepoResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One open database transaction
pub struct PgUnitOfWork {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    #[instrument(skip(self))]
    async fn lock_item(&mut self, id: Snowflake) -> RepoResult<Option<Item>> {
        let result = sqlx::query_as::<_, ItemModel>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Item::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_transaction(&mut self, id: Snowflake) -> RepoResult<Option<Transaction>> {
        let result = sqlx::query_as::<_, TransactionModel>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE t.id = $1 FOR UPDATE"
        ))
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Transaction::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn pending_transaction_for_item(&mut self, item_id: Snowflake) -> RepoResult<Option<Transaction>> {
        let result = sqlx::query_as::<_, TransactionModel>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t \
             WHERE t.item_id = $1 AND t.status = 'pending' \
             ORDER BY t.created_at DESC, t.id DESC LIMIT 1"
        ))
        .bind(item_id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Transaction::try_from).transpose()
    }

    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id))]
    async fn insert_transaction(&mut self, transaction: &Transaction) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO transactions (id, item_id, buyer_id, status, occurred_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(transaction.id.into_inner())
        .bind(transaction.item_id.into_inner())
        .bind(transaction.buyer_id.into_inner())
        .bind(transaction.status.as_str())
        .bind(transaction.occurred_at)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_violation_of(&e, ONE_PENDING_PER_ITEM) {
                DomainError::ItemAlreadyPending
            } else {
                map_db_error(e)
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_transaction_status(
        &mut self,
        id: Snowflake,
        status: TransactionStatus,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE transactions SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_violation_of(&e, ONE_PENDING_PER_ITEM) {
                DomainError::ItemAlreadyPending
            } else {
                map_db_error(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TransactionNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn swap_item_availability(
        &mut self,
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
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        row.map_or_else(|| Err(DomainError::StaleItemVersion), availability_from_row)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgUnitOfWorkFactory>();
    }

    #[test]
    fn test_unit_of_work_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<PgUnitOfWork>();
    }
}
