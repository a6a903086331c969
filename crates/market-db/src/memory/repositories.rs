//! Repository ports over [`MemoryStore`]

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::BTreeSet;

use market_core::entities::{ChatMessage, Item, Transaction, User};
use market_core::error::DomainError;
use market_core::traits::{
    ChatRepository, ItemQuery, ItemRepository, RepoResult, TransactionRepository, UserRepository,
};
use market_core::value_objects::{Availability, ItemStatus, Page, PageRequest, Snowflake};

use super::{paginate, MemoryStore, UserRow};

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, Snowflake)) {
    rows.sort_by_key(|row| Reverse(key(row)));
}

// ============================================================================
// Users
// ============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let state = self.inner.state.lock();
        Ok(state
            .users
            .get(&id)
            .filter(|row| row.user.deleted_at.is_none())
            .map(|row| row.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let state = self.inner.state.lock();
        Ok(state
            .users
            .values()
            .find(|row| row.user.deleted_at.is_none() && row.user.email.eq_ignore_ascii_case(email))
            .map(|row| row.user.clone()))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(UserRepository::find_by_email(self, email).await?.is_some())
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> RepoResult<Page<User>> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut rows: Vec<User> = {
            let state = self.inner.state.lock();
            state
                .users
                .values()
                .map(|row| &row.user)
                .filter(|u| u.deleted_at.is_none())
                .filter(|u| {
                    needle.as_deref().map_or(true, |n| {
                        u.name.to_lowercase().contains(n) || u.email.to_lowercase().contains(n)
                    })
                })
                .cloned()
                .collect()
        };
        newest_first(&mut rows, |u| (u.created_at, u.id));
        Ok(paginate(rows, page))
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        let taken = state
            .users
            .values()
            .any(|row| row.user.deleted_at.is_none() && row.user.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(DomainError::EmailAlreadyExists);
        }
        state.users.insert(
            user.id,
            UserRow {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn update(&self, user: &User, password_hash: Option<&str>) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        let taken = state.users.values().any(|row| {
            row.user.id != user.id
                && row.user.deleted_at.is_none()
                && row.user.email.eq_ignore_ascii_case(&user.email)
        });
        if taken {
            return Err(DomainError::EmailAlreadyExists);
        }

        let row = state
            .users
            .get_mut(&user.id)
            .filter(|row| row.user.deleted_at.is_none())
            .ok_or(DomainError::UserNotFound(user.id))?;
        row.user.name.clone_from(&user.name);
        row.user.email.clone_from(&user.email);
        row.user.phone.clone_from(&user.phone);
        row.user.address.clone_from(&user.address);
        if let Some(hash) = password_hash {
            row.password_hash = hash.to_string();
        }
        row.user.updated_at = Utc::now();
        Ok(())
    }

    async fn soft_delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        let row = state
            .users
            .get_mut(&id)
            .filter(|row| row.user.deleted_at.is_none())
            .ok_or(DomainError::UserNotFound(id))?;
        let now = Utc::now();
        row.user.deleted_at = Some(now);
        row.user.updated_at = now;
        Ok(())
    }

    async fn hard_delete(&self, id: Snowflake) -> RepoResult<()> {
        let _gate = self.inner.gate.lock().await;
        let mut state = self.inner.state.lock();
        if state.users.remove(&id).is_none() {
            return Err(DomainError::UserNotFound(id));
        }

        let owned: Vec<Snowflake> = state
            .items
            .values()
            .filter(|item| item.owner_id == id)
            .map(|item| item.id)
            .collect();
        for item_id in owned {
            state.remove_item_cascade(item_id);
        }

        // open purchases die with the buyer; their items go back on sale
        let held: Vec<Snowflake> = state
            .transactions
            .values()
            .filter(|t| t.buyer_id == id && t.is_pending())
            .map(|t| t.item_id)
            .collect();
        for item_id in held {
            if let Some(item) = state
                .items
                .get_mut(&item_id)
                .filter(|i| !i.is_deleted() && i.status == ItemStatus::Sold)
            {
                item.set_availability(item.availability().advance(ItemStatus::Available));
            }
        }
        state.transactions.retain(|_, t| t.buyer_id != id);
        state.chats.retain(|_, c| !c.involves(id));
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        let state = self.inner.state.lock();
        Ok(state
            .users
            .get(&id)
            .filter(|row| row.user.deleted_at.is_none())
            .map(|row| row.password_hash.clone()))
    }
}

// ============================================================================
// Items
// ============================================================================

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Item>> {
        let state = self.inner.state.lock();
        Ok(state.items.get(&id).filter(|i| !i.is_deleted()).cloned())
    }

    async fn find_including_deleted(&self, id: Snowflake) -> RepoResult<Option<Item>> {
        Ok(self.inner.state.lock().items.get(&id).cloned())
    }

    async fn list(&self, query: &ItemQuery, page: PageRequest) -> RepoResult<Page<Item>> {
        let mut rows: Vec<Item> = {
            let state = self.inner.state.lock();
            state
                .items
                .values()
                .filter(|i| !i.is_deleted() && query.matches(i))
                .cloned()
                .collect()
        };
        newest_first(&mut rows, |i| (i.created_at, i.id));
        Ok(paginate(rows, page))
    }

    async fn list_by_owner(&self, owner_id: Snowflake, page: PageRequest) -> RepoResult<Page<Item>> {
        let mut rows: Vec<Item> = {
            let state = self.inner.state.lock();
            state
                .items
                .values()
                .filter(|i| !i.is_deleted() && i.owner_id == owner_id)
                .cloned()
                .collect()
        };
        newest_first(&mut rows, |i| (i.created_at, i.id));
        Ok(paginate(rows, page))
    }

    async fn create(&self, item: &Item) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        if !state.users.contains_key(&item.owner_id) {
            return Err(DomainError::DatabaseError(format!(
                "owner {} does not exist",
                item.owner_id
            )));
        }
        state.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_details(&self, item: &Item) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        let stored = state
            .items
            .get_mut(&item.id)
            .filter(|i| !i.is_deleted())
            .ok_or(DomainError::ItemNotFound(item.id))?;
        stored.title.clone_from(&item.title);
        stored.price = item.price;
        stored.category = item.category;
        stored.description.clone_from(&item.description);
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn set_image_url(&self, id: Snowflake, url: &str) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        let stored = state
            .items
            .get_mut(&id)
            .filter(|i| !i.is_deleted())
            .ok_or(DomainError::ItemNotFound(id))?;
        stored.image_url = Some(url.to_string());
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn compare_and_set_status(
        &self,
        id: Snowflake,
        expected: Availability,
        next: ItemStatus,
    ) -> RepoResult<Availability> {
        let _gate = self.inner.gate.lock().await;
        let mut state = self.inner.state.lock();
        let item = state
            .items
            .get_mut(&id)
            .filter(|i| !i.is_deleted() && i.availability() == expected)
            .ok_or(DomainError::StaleItemVersion)?;
        let advanced = expected.advance(next);
        item.set_availability(advanced);
        Ok(advanced)
    }

    async fn soft_delete(&self, id: Snowflake, expected: Availability) -> RepoResult<()> {
        let _gate = self.inner.gate.lock().await;
        let mut state = self.inner.state.lock();
        let item = state
            .items
            .get_mut(&id)
            .filter(|i| !i.is_deleted() && i.availability() == expected)
            .ok_or(DomainError::StaleItemVersion)?;
        item.set_availability(expected.advance(ItemStatus::Removed));
        item.deleted_at = Some(item.updated_at);
        Ok(())
    }

    async fn hard_delete(&self, id: Snowflake) -> RepoResult<()> {
        let _gate = self.inner.gate.lock().await;
        let mut state = self.inner.state.lock();
        if state.remove_item_cascade(id) {
            Ok(())
        } else {
            Err(DomainError::ItemNotFound(id))
        }
    }
}

// ============================================================================
// Transactions
// ============================================================================

impl MemoryStore {
    fn transactions_where(
        &self,
        page: PageRequest,
        keep: impl Fn(&Transaction, Option<&Item>) -> bool,
    ) -> Page<Transaction> {
        let mut rows: Vec<Transaction> = {
            let state = self.inner.state.lock();
            state
                .transactions
                .values()
                .filter(|t| keep(t, state.items.get(&t.item_id)))
                .cloned()
                .collect()
        };
        newest_first(&mut rows, |t| (t.created_at, t.id));
        paginate(rows, page)
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Transaction>> {
        Ok(self.inner.state.lock().transactions.get(&id).cloned())
    }

    async fn list_by_buyer(&self, buyer_id: Snowflake, page: PageRequest) -> RepoResult<Page<Transaction>> {
        Ok(self.transactions_where(page, |t, _| t.buyer_id == buyer_id))
    }

    async fn list_by_seller(&self, seller_id: Snowflake, page: PageRequest) -> RepoResult<Page<Transaction>> {
        Ok(self.transactions_where(page, |_, item| {
            item.is_some_and(|i| i.owner_id == seller_id)
        }))
    }

    async fn list_all(&self, page: PageRequest) -> RepoResult<Page<Transaction>> {
        Ok(self.transactions_where(page, |_, _| true))
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let _gate = self.inner.gate.lock().await;
        let mut state = self.inner.state.lock();
        state
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::TransactionNotFound(id))
    }
}

// ============================================================================
// Chats
// ============================================================================

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChatMessage>> {
        Ok(self.inner.state.lock().chats.get(&id).cloned())
    }

    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        if !state.items.contains_key(&message.item_id) {
            return Err(DomainError::DatabaseError(format!(
                "item {} does not exist",
                message.item_id
            )));
        }
        state.chats.insert(message.id, message.clone());
        Ok(())
    }

    async fn list_for_item(&self, item_id: Snowflake, page: PageRequest) -> RepoResult<Page<ChatMessage>> {
        let mut rows: Vec<ChatMessage> = {
            let state = self.inner.state.lock();
            state
                .chats
                .values()
                .filter(|c| c.item_id == item_id)
                .cloned()
                .collect()
        };
        newest_first(&mut rows, |c| (c.sent_at, c.id));
        Ok(paginate(rows, page))
    }

    async fn conversation(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        item_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<ChatMessage>> {
        let mut rows: Vec<ChatMessage> = {
            let state = self.inner.state.lock();
            state
                .chats
                .values()
                .filter(|c| {
                    c.item_id == item_id
                        && ((c.sender_id == user_a && c.receiver_id == user_b)
                            || (c.sender_id == user_b && c.receiver_id == user_a))
                })
                .cloned()
                .collect()
        };
        rows.sort_by_key(|c| (c.sent_at, c.id));
        Ok(paginate(rows, page))
    }

    async fn mark_conversation_read(
        &self,
        reader_id: Snowflake,
        sender_id: Snowflake,
        item_id: Snowflake,
    ) -> RepoResult<u64> {
        let mut state = self.inner.state.lock();
        let mut changed = 0;
        for chat in state.chats.values_mut().filter(|c| {
            c.item_id == item_id && c.receiver_id == reader_id && c.sender_id == sender_id && !c.is_read
        }) {
            chat.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn mark_read(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        let chat = state.chats.get_mut(&id).ok_or(DomainError::ChatNotFound(id))?;
        chat.is_read = true;
        Ok(())
    }

    async fn partners(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let state = self.inner.state.lock();
        let partners: BTreeSet<Snowflake> = state
            .chats
            .values()
            .filter(|c| c.involves(user_id))
            .map(|c| c.counterpart_of(user_id))
            .collect();
        Ok(partners.into_iter().collect())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        state
            .chats
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::ChatNotFound(id))
    }
}
