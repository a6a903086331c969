//! Unit of work over [`MemoryStore`]
//!
//! Writes are staged locally and folded into the shared state on commit.
//! Holding the gate for the whole scope gives the same isolation PostgreSQL
//! row locks give the real backend.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::OwnedMutexGuard;

use market_core::entities::{Item, Transaction, TransactionStatus};
use market_core::error::DomainError;
use market_core::traits::{RepoResult, UnitOfWork, UnitOfWorkFactory};
use market_core::value_objects::{Availability, ItemStatus, Snowflake};

use super::MemoryStore;

#[async_trait]
impl UnitOfWorkFactory for MemoryStore {
    async fn begin(&self) -> RepoResult<Box<dyn UnitOfWork>> {
        let guard = self.inner.gate.clone().lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            store: self.clone(),
            _gate: guard,
            availability: HashMap::new(),
            inserted: Vec::new(),
            statuses: HashMap::new(),
        }))
    }
}

/// Staged writes of one open scope
pub struct MemoryUnitOfWork {
    store: MemoryStore,
    _gate: OwnedMutexGuard<()>,
    availability: HashMap<Snowflake, Availability>,
    inserted: Vec<Transaction>,
    statuses: HashMap<Snowflake, TransactionStatus>,
}

impl MemoryUnitOfWork {
    fn staged_item(&self, item: Item) -> Item {
        match self.availability.get(&item.id) {
            Some(availability) => Item {
                status: availability.status,
                version: availability.version,
                ..item
            },
            None => item,
        }
    }

    fn staged_transaction(&self, mut transaction: Transaction) -> Transaction {
        if let Some(status) = self.statuses.get(&transaction.id) {
            transaction.status = *status;
        }
        transaction
    }

    /// Committed rows plus staged inserts, with staged statuses applied
    fn transactions_for_item(&self, item_id: Snowflake) -> Vec<Transaction> {
        let committed: Vec<Transaction> = {
            let state = self.store.inner.state.lock();
            state
                .transactions
                .values()
                .filter(|t| t.item_id == item_id)
                .cloned()
                .collect()
        };
        committed
            .into_iter()
            .chain(self.inserted.iter().filter(|t| t.item_id == item_id).cloned())
            .map(|t| self.staged_transaction(t))
            .collect()
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_item(&mut self, id: Snowflake) -> RepoResult<Option<Item>> {
        let item = self.store.inner.state.lock().items.get(&id).cloned();
        Ok(item.map(|item| self.staged_item(item)))
    }

    async fn find_transaction(&mut self, id: Snowflake) -> RepoResult<Option<Transaction>> {
        let committed = self.store.inner.state.lock().transactions.get(&id).cloned();
        let found = committed.or_else(|| self.inserted.iter().find(|t| t.id == id).cloned());
        Ok(found.map(|t| self.staged_transaction(t)))
    }

    async fn pending_transaction_for_item(&mut self, item_id: Snowflake) -> RepoResult<Option<Transaction>> {
        Ok(self
            .transactions_for_item(item_id)
            .into_iter()
            .filter(Transaction::is_pending)
            .max_by_key(|t| (t.created_at, t.id)))
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> RepoResult<()> {
        if transaction.is_pending()
            && self
                .transactions_for_item(transaction.item_id)
                .iter()
                .any(Transaction::is_pending)
        {
            return Err(DomainError::ItemAlreadyPending);
        }
        self.inserted.push(transaction.clone());
        Ok(())
    }

    async fn update_transaction_status(
        &mut self,
        id: Snowflake,
        status: TransactionStatus,
    ) -> RepoResult<()> {
        let current = self
            .find_transaction(id)
            .await?
            .ok_or(DomainError::TransactionNotFound(id))?;

        if status == TransactionStatus::Pending && !current.is_pending() {
            let other_pending = self
                .transactions_for_item(current.item_id)
                .iter()
                .any(|t| t.id != id && t.is_pending());
            if other_pending {
                return Err(DomainError::ItemAlreadyPending);
            }
        }

        self.statuses.insert(id, status);
        Ok(())
    }

    async fn swap_item_availability(
        &mut self,
        id: Snowflake,
        expected: Availability,
        next: ItemStatus,
    ) -> RepoResult<Availability> {
        if self.store.take_swap_failure() {
            return Err(DomainError::DatabaseError("injected swap failure".into()));
        }

        let current = self
            .lock_item(id)
            .await?
            .filter(|item| !item.is_deleted())
            .map(|item| item.availability());
        if current != Some(expected) {
            return Err(DomainError::StaleItemVersion);
        }

        let advanced = expected.advance(next);
        self.availability.insert(id, advanced);
        Ok(advanced)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let this = *self;
        let now = Utc::now();
        {
            let mut state = this.store.inner.state.lock();

            for (id, availability) in &this.availability {
                let item = state
                    .items
                    .get_mut(id)
                    .ok_or(DomainError::ItemNotFound(*id))?;
                item.set_availability(*availability);
            }
            for transaction in this.inserted {
                state.transactions.insert(transaction.id, transaction);
            }
            for (id, status) in &this.statuses {
                if let Some(transaction) = state.transactions.get_mut(id) {
                    if transaction.status != *status {
                        transaction.status = *status;
                        transaction.updated_at = now;
                    }
                }
            }
        }
        // gate released here
        Ok(())
    }
}
