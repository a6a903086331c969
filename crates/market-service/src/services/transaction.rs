//! Transaction service
//!
//! The purchase state machine. `Pending` moves to `Completed` or
//! `Cancelled`, both terminal. Writes that must land together with an item
//! status flip (purchase, cancellation) run inside one unit of work that
//! locks the transaction row first and the item row second.

use market_core::entities::{Item, Transaction, TransactionStatus};
use market_core::{Caller, DomainError, ItemStatus, Page, PageRequest, Snowflake};
use tracing::instrument;

use crate::dto::{PaginatedResponse, TransactionResponse, TransactionWithItem};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Transaction service
pub struct TransactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TransactionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Buy an item.
    ///
    /// Inserting the pending transaction and flipping the item to `sold`
    /// commit together; any failure in between leaves both untouched.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        caller: Caller,
        item_id: Snowflake,
    ) -> ServiceResult<TransactionResponse> {
        let mut uow = self.ctx.units().begin().await?;

        let mut item = uow
            .lock_item(item_id)
            .await?
            .filter(|item| !item.is_deleted())
            .ok_or(DomainError::ItemNotFound(item_id))?;

        if !item.availability().is_available() {
            return Err(DomainError::ItemNotAvailable.into());
        }
        if item.is_owned_by(caller.user_id) {
            return Err(DomainError::SelfPurchase.into());
        }
        if uow.pending_transaction_for_item(item_id).await?.is_some() {
            return Err(DomainError::ItemAlreadyPending.into());
        }

        let transaction = Transaction::open(self.ctx.generate_id(), item_id, caller.user_id);
        uow.insert_transaction(&transaction).await?;
        let sold = uow
            .swap_item_availability(item_id, item.availability(), ItemStatus::Sold)
            .await?;
        uow.commit().await?;

        item.set_availability(sold);
        Ok(TransactionWithItem { transaction, item }.into())
    }

    /// Complete or cancel a pending transaction; buyer or seller only.
    ///
    /// Cancelling puts the item back on sale in the same unit of work.
    /// A listing removed in the meantime stays removed.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        caller: Caller,
        transaction_id: Snowflake,
        status: &str,
    ) -> ServiceResult<TransactionResponse> {
        let requested: TransactionStatus = status.parse()?;
        let mut uow = self.ctx.units().begin().await?;

        let mut transaction = uow
            .find_transaction(transaction_id)
            .await?
            .ok_or(DomainError::TransactionNotFound(transaction_id))?;
        let mut item = uow
            .lock_item(transaction.item_id)
            .await?
            .ok_or(DomainError::ItemNotFound(transaction.item_id))?;

        if !transaction.is_buyer(caller.user_id) && !item.is_owned_by(caller.user_id) {
            return Err(DomainError::NotTransactionParticipant.into());
        }

        let next = transaction.status.transition_to(requested)?;
        uow.update_transaction_status(transaction_id, next).await?;

        if next == TransactionStatus::Cancelled && !item.is_deleted() {
            let relisted = uow
                .swap_item_availability(item.id, item.availability(), ItemStatus::Available)
                .await?;
            item.set_availability(relisted);
        }
        uow.commit().await?;

        transaction.status = next;
        Ok(TransactionWithItem { transaction, item }.into())
    }

    /// Remove a transaction record; seller only.
    ///
    /// This is record cleanup, not a lifecycle step: the item keeps
    /// whatever status it has, so deleting a pending purchase leaves it
    /// `sold`.
    #[instrument(skip(self))]
    pub async fn delete(&self, caller: Caller, transaction_id: Snowflake) -> ServiceResult<()> {
        let TransactionWithItem { item, .. } = self.load(transaction_id).await?;
        if !item.is_owned_by(caller.user_id) {
            return Err(DomainError::NotSeller.into());
        }
        self.ctx.transaction_repo().delete(transaction_id).await?;
        Ok(())
    }

    /// Buyer, seller or admin
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        caller: Caller,
        transaction_id: Snowflake,
    ) -> ServiceResult<TransactionResponse> {
        let found = self.load(transaction_id).await?;
        let participant = found.transaction.is_buyer(caller.user_id)
            || found.item.is_owned_by(caller.user_id);
        if !participant && !caller.is_admin() {
            return Err(DomainError::NotTransactionParticipant.into());
        }
        Ok(found.into())
    }

    /// The caller's purchases, newest first
    #[instrument(skip(self))]
    pub async fn list_by_buyer(
        &self,
        caller: Caller,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<TransactionResponse>> {
        let page = self
            .ctx
            .transaction_repo()
            .list_by_buyer(caller.user_id, page)
            .await?;
        self.with_items(page).await
    }

    /// Transactions on the caller's items, newest first
    #[instrument(skip(self))]
    pub async fn list_by_seller(
        &self,
        caller: Caller,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<TransactionResponse>> {
        let page = self
            .ctx
            .transaction_repo()
            .list_by_seller(caller.user_id, page)
            .await?;
        self.with_items(page).await
    }

    /// Every transaction; admin only
    #[instrument(skip(self))]
    pub async fn list_all(
        &self,
        caller: Caller,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<TransactionResponse>> {
        if !caller.is_admin() {
            return Err(DomainError::AdminOnly.into());
        }
        let page = self.ctx.transaction_repo().list_all(page).await?;
        self.with_items(page).await
    }

    async fn load(&self, transaction_id: Snowflake) -> ServiceResult<TransactionWithItem> {
        let transaction = self
            .ctx
            .transaction_repo()
            .find_by_id(transaction_id)
            .await?
            .ok_or(DomainError::TransactionNotFound(transaction_id))?;
        let item = self.item_of(&transaction).await?;
        Ok(TransactionWithItem { transaction, item })
    }

    async fn item_of(&self, transaction: &Transaction) -> ServiceResult<Item> {
        self.ctx
            .item_repo()
            .find_including_deleted(transaction.item_id)
            .await?
            .ok_or_else(|| DomainError::ItemNotFound(transaction.item_id).into())
    }

    async fn with_items(
        &self,
        page: Page<Transaction>,
    ) -> ServiceResult<PaginatedResponse<TransactionResponse>> {
        let mut joined = Vec::with_capacity(page.items.len());
        for transaction in &page.items {
            joined.push(TransactionWithItem {
                item: self.item_of(transaction).await?,
                transaction: transaction.clone(),
            });
        }
        let page = Page::new(joined, page.total, page.request);
        Ok(PaginatedResponse::from_page(page, TransactionResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::item::ItemService;
    use crate::services::testing::{new_admin, new_item, new_user, Harness};
    use market_core::traits::TransactionRepository;

    fn status_of(h: &Harness, item_id: Snowflake) -> ItemStatus {
        h.store.raw_item(item_id).unwrap().status
    }

    fn pending_count(h: &Harness, item_id: Snowflake) -> usize {
        h.store
            .snapshot_transactions()
            .iter()
            .filter(|t| t.item_id == item_id && t.is_pending())
            .count()
    }

    #[tokio::test]
    async fn test_purchase_cancel_and_repurchase() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let first_buyer = new_user(&h, "first").await;
        let second_buyer = new_user(&h, "second").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t1 = service.create(first_buyer, item.id).await.unwrap();
        assert_eq!(t1.status, TransactionStatus::Pending);
        assert_eq!(t1.seller_id, seller.user_id.to_string());
        assert_eq!(t1.item.status, ItemStatus::Sold);
        assert_eq!(status_of(&h, item.id), ItemStatus::Sold);

        let t1_id: Snowflake = t1.id.parse().unwrap();
        let cancelled = service
            .update_status(first_buyer, t1_id, "cancelled")
            .await
            .unwrap();
        assert_eq!(cancelled.status, TransactionStatus::Cancelled);
        assert_eq!(status_of(&h, item.id), ItemStatus::Available);

        let t2 = service.create(second_buyer, item.id).await.unwrap();
        assert_eq!(t2.status, TransactionStatus::Pending);
        assert_eq!(status_of(&h, item.id), ItemStatus::Sold);
        assert_eq!(pending_count(&h, item.id), 1);
    }

    #[tokio::test]
    async fn test_complete_keeps_item_sold() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t = service.create(buyer, item.id).await.unwrap();
        let id: Snowflake = t.id.parse().unwrap();

        let completed = service.update_status(seller, id, "completed").await.unwrap();
        assert_eq!(completed.status, TransactionStatus::Completed);
        assert_eq!(status_of(&h, item.id), ItemStatus::Sold);
    }

    #[tokio::test]
    async fn test_terminal_transactions_are_immutable() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t = service.create(buyer, item.id).await.unwrap();
        let id: Snowflake = t.id.parse().unwrap();
        service.update_status(buyer, id, "completed").await.unwrap();
        let before = h.store.raw_item(item.id).unwrap();

        for target in ["cancelled", "completed"] {
            let err = service.update_status(seller, id, target).await.unwrap_err();
            assert_eq!(err.status_code(), 409);
            assert_eq!(err.error_code(), "TRANSACTION_TERMINAL");
        }
        assert_eq!(h.store.raw_item(item.id).unwrap().availability(), before.availability());
        assert_eq!(
            TransactionRepository::find_by_id(&h.store, id).await.unwrap().unwrap().status,
            TransactionStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_pending_is_not_a_valid_target() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t = service.create(buyer, item.id).await.unwrap();
        let err = service
            .update_status(buyer, t.id.parse().unwrap(), "pending")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_create_rejections_write_nothing() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let err = service.create(buyer, Snowflake::new(12345)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = service.create(seller, item.id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "SELF_PURCHASE");

        ItemService::new(&h.ctx)
            .set_status(seller, item.id, "removed")
            .await
            .unwrap();
        let before = h.store.raw_item(item.id).unwrap();
        let err = service.create(buyer, item.id).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "ITEM_NOT_AVAILABLE");

        assert!(h.store.snapshot_transactions().is_empty());
        assert_eq!(h.store.raw_item(item.id).unwrap().availability(), before.availability());
    }

    #[tokio::test]
    async fn test_concurrent_purchases_only_one_wins() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let item = new_item(&h, seller).await;
        let mut buyers = Vec::new();
        for n in 0..8 {
            buyers.push(new_user(&h, &format!("buyer{n}")).await);
        }

        let service = TransactionService::new(&h.ctx);
        let attempts = buyers.iter().map(|buyer| service.create(*buyer, item.id));
        let results = futures::future::join_all(attempts).await;

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for err in results.into_iter().filter_map(Result::err) {
            assert_eq!(err.status_code(), 409);
        }
        assert_eq!(pending_count(&h, item.id), 1);
        assert_eq!(status_of(&h, item.id), ItemStatus::Sold);
    }

    #[tokio::test]
    async fn test_failed_status_flip_rolls_back_purchase() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        h.store.fail_next_swap();
        let err = service.create(buyer, item.id).await.unwrap_err();
        assert_eq!(err.status_code(), 500);

        assert!(h.store.snapshot_transactions().is_empty());
        assert_eq!(status_of(&h, item.id), ItemStatus::Available);

        // the item is still purchasable afterwards
        service.create(buyer, item.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_relist_rolls_back_cancellation() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t = service.create(buyer, item.id).await.unwrap();
        let id: Snowflake = t.id.parse().unwrap();

        h.store.fail_next_swap();
        assert!(service.update_status(buyer, id, "cancelled").await.is_err());
        assert_eq!(
            TransactionRepository::find_by_id(&h.store, id).await.unwrap().unwrap().status,
            TransactionStatus::Pending
        );
        assert_eq!(status_of(&h, item.id), ItemStatus::Sold);
    }

    #[tokio::test]
    async fn test_update_status_participants_only() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let stranger = new_user(&h, "stranger").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t = service.create(buyer, item.id).await.unwrap();
        let id: Snowflake = t.id.parse().unwrap();

        let err = service.update_status(stranger, id, "cancelled").await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(status_of(&h, item.id), ItemStatus::Sold);

        let err = service
            .update_status(buyer, Snowflake::new(999), "cancelled")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_cancel_after_listing_removed_skips_relist() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t = service.create(buyer, item.id).await.unwrap();
        ItemService::new(&h.ctx).delete(seller, item.id).await.unwrap();

        let cancelled = service
            .update_status(buyer, t.id.parse().unwrap(), "cancelled")
            .await
            .unwrap();
        assert_eq!(cancelled.status, TransactionStatus::Cancelled);
        assert_eq!(status_of(&h, item.id), ItemStatus::Removed);
    }

    #[tokio::test]
    async fn test_seller_delete_leaves_item_sold() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t = service.create(buyer, item.id).await.unwrap();
        let id: Snowflake = t.id.parse().unwrap();

        let err = service.delete(buyer, id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        service.delete(seller, id).await.unwrap();
        assert!(h.store.snapshot_transactions().is_empty());
        // record cleanup does not put the item back on sale
        assert_eq!(status_of(&h, item.id), ItemStatus::Sold);

        let err = service.delete(seller, id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_reads_are_access_controlled() {
        let h = Harness::new();
        let seller = new_user(&h, "seller").await;
        let buyer = new_user(&h, "buyer").await;
        let stranger = new_user(&h, "stranger").await;
        let admin = new_admin(&h).await;
        let item = new_item(&h, seller).await;
        let service = TransactionService::new(&h.ctx);

        let t = service.create(buyer, item.id).await.unwrap();
        let id: Snowflake = t.id.parse().unwrap();

        for caller in [buyer, seller, admin] {
            assert_eq!(service.get(caller, id).await.unwrap().id, t.id);
        }
        assert_eq!(service.get(stranger, id).await.unwrap_err().status_code(), 403);

        let purchases = service.list_by_buyer(buyer, PageRequest::default()).await.unwrap();
        assert_eq!(purchases.pagination.total_items, 1);
        assert_eq!(purchases.data[0].item.title, item.title);

        let sales = service.list_by_seller(seller, PageRequest::default()).await.unwrap();
        assert_eq!(sales.data[0].id, t.id);
        assert_eq!(
            service
                .list_by_seller(buyer, PageRequest::default())
                .await
                .unwrap()
                .pagination
                .total_items,
            0
        );

        assert_eq!(
            service.list_all(buyer, PageRequest::default()).await.unwrap_err().error_code(),
            "ADMIN_ONLY"
        );
        assert_eq!(
            service.list_all(admin, PageRequest::default()).await.unwrap().data.len(),
            1
        );
    }
}
