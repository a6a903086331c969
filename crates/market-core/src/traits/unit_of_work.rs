//! Unit of work - one atomic scope over items and transactions
//!
//! A purchase inserts a transaction and flips the item to `sold`; a
//! cancellation marks the transaction and flips the item back. Each pair
//! must land together or not at all, so both writes go through a single
//! [`UnitOfWork`] and become visible only on [`UnitOfWork::commit`].
//! Dropping a unit of work without committing discards every write.
//!
//! Lock order is transaction row before item row.

use async_trait::async_trait;

use crate::entities::{Item, Transaction, TransactionStatus};
use crate::value_objects::{Availability, ItemStatus, Snowflake};

use super::RepoResult;

#[async_trait]
pub trait UnitOfWork: Send {
    /// Read an item and hold it against concurrent writers until the scope
    /// ends. Soft-deleted items are returned too so callers can tell a
    /// removed listing from a missing one.
    async fn lock_item(&mut self, id: Snowflake) -> RepoResult<Option<Item>>;

    /// Read a transaction and hold it until the scope ends
    async fn find_transaction(&mut self, id: Snowflake) -> RepoResult<Option<Transaction>>;

    /// Any pending transaction for the item
    async fn pending_transaction_for_item(&mut self, item_id: Snowflake) -> RepoResult<Option<Transaction>>;

    /// Insert a new transaction. A second pending transaction for the same
    /// item fails with [`DomainError::ItemAlreadyPending`](crate::DomainError::ItemAlreadyPending).
    async fn insert_transaction(&mut self, transaction: &Transaction) -> RepoResult<()>;

    /// Overwrite a transaction's status
    async fn update_transaction_status(
        &mut self,
        id: Snowflake,
        status: TransactionStatus,
    ) -> RepoResult<()>;

    /// Compare-and-swap of the item's availability within this scope
    async fn swap_item_availability(
        &mut self,
        id: Snowflake,
        expected: Availability,
        next: ItemStatus,
    ) -> RepoResult<Availability>;

    /// Make every write of this scope visible at once
    async fn commit(self: Box<Self>) -> RepoResult<()>;
}

/// Opens units of work
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> RepoResult<Box<dyn UnitOfWork>>;
}
