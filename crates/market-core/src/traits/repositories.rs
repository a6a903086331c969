//! Repository traits (ports) - define the interface for data access
//!
//! Single-row reads and writes live here. Anything that must change an item
//! and a transaction together goes through a [`UnitOfWork`](super::UnitOfWork).
//!
//! Soft-deleted rows are invisible to every `find_*` and `list_*` method.

use async_trait::async_trait;

use crate::entities::{Category, ChatMessage, Item, Transaction, User};
use crate::error::DomainError;
use crate::value_objects::{Availability, ItemStatus, Page, PageRequest, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by (normalized) email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Admin listing, optional case-insensitive search on name and email
    async fn list(&self, search: Option<&str>, page: PageRequest) -> RepoResult<Page<User>>;

    /// Create a new user
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Update profile fields (name, email, phone, address), and the password
    /// hash when one is given, in a single write
    async fn update(&self, user: &User, password_hash: Option<&str>) -> RepoResult<()>;

    /// Soft delete a user
    async fn soft_delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Remove the row and everything that references it
    async fn hard_delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;
}

// ============================================================================
// Item Repository
// ============================================================================

/// Filters for the public item listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub category: Option<Category>,
    pub status: ItemStatus,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            status: ItemStatus::Available,
        }
    }
}

impl ItemQuery {
    /// In-process evaluation of the filter
    pub fn matches(&self, item: &Item) -> bool {
        if item.status != self.status {
            return false;
        }
        if self.category.is_some_and(|c| c != item.category) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                item.title.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Find item by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Item>>;

    /// Find item by ID even if soft-deleted; transaction history still
    /// needs to know who sold it
    async fn find_including_deleted(&self, id: Snowflake) -> RepoResult<Option<Item>>;

    /// Filtered listing, newest first
    async fn list(&self, query: &ItemQuery, page: PageRequest) -> RepoResult<Page<Item>>;

    /// Items of one seller in any status, newest first
    async fn list_by_owner(&self, owner_id: Snowflake, page: PageRequest) -> RepoResult<Page<Item>>;

    /// Create a new item
    async fn create(&self, item: &Item) -> RepoResult<()>;

    /// Persist title, price, category and description. Status, version and
    /// the image URL are never written here.
    async fn update_details(&self, item: &Item) -> RepoResult<()>;

    /// Point the live item at a stored image
    async fn set_image_url(&self, id: Snowflake, url: &str) -> RepoResult<()>;

    /// Move the item to `next` only if it is still at `expected`.
    ///
    /// Returns the new availability, or [`DomainError::StaleItemVersion`]
    /// when another writer got there first.
    async fn compare_and_set_status(
        &self,
        id: Snowflake,
        expected: Availability,
        next: ItemStatus,
    ) -> RepoResult<Availability>;

    /// Mark `removed` and set `deleted_at`, guarded like
    /// [`compare_and_set_status`](Self::compare_and_set_status)
    async fn soft_delete(&self, id: Snowflake, expected: Availability) -> RepoResult<()>;

    /// Remove the row together with its transactions and chats
    async fn hard_delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Transaction Repository
// ============================================================================

/// Read side of transactions plus record removal.
///
/// Creating a transaction and changing its status are only possible through
/// a unit of work, alongside the matching item status change.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Find transaction by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Transaction>>;

    /// Purchases of one buyer, newest first
    async fn list_by_buyer(&self, buyer_id: Snowflake, page: PageRequest) -> RepoResult<Page<Transaction>>;

    /// Sales of one seller, newest first
    async fn list_by_seller(&self, seller_id: Snowflake, page: PageRequest) -> RepoResult<Page<Transaction>>;

    /// Everything, newest first
    async fn list_all(&self, page: PageRequest) -> RepoResult<Page<Transaction>>;

    /// Delete the record. Item status is left alone.
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Chat Repository
// ============================================================================

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChatMessage>>;

    /// Store a new message
    async fn create(&self, message: &ChatMessage) -> RepoResult<()>;

    /// All messages about one item, newest first
    async fn list_for_item(&self, item_id: Snowflake, page: PageRequest) -> RepoResult<Page<ChatMessage>>;

    /// Messages in either direction between two users about one item, oldest first
    async fn conversation(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        item_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<ChatMessage>>;

    /// Mark every message from `sender_id` to `reader_id` about the item as read.
    /// Returns how many changed.
    async fn mark_conversation_read(
        &self,
        reader_id: Snowflake,
        sender_id: Snowflake,
        item_id: Snowflake,
    ) -> RepoResult<u64>;

    /// Mark one message as read
    async fn mark_read(&self, id: Snowflake) -> RepoResult<()>;

    /// Distinct users `user_id` has sent to or received from
    async fn partners(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Delete a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}
