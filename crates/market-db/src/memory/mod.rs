//! In-memory backend
//!
//! Implements every repository port and the unit of work over plain maps so
//! the services can run without PostgreSQL (tests, local demos).
//!
//! Locking model:
//! - `state` is a short-lived `parking_lot` mutex taken for each read or write.
//! - `gate` is an async mutex. A unit of work holds it from `begin` until it
//!   is committed or dropped, and every write that PostgreSQL would guard
//!   with a row lock (item status, transaction rows, cascading deletes) takes
//!   it too. Code holding a unit of work must not call those writes.

mod repositories;
mod unit_of_work;

use parking_lot::Mutex;
use std::collections::BTreeMap;
#[cfg(any(test, feature = "testing"))]
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use market_core::entities::{ChatMessage, Item, Transaction, User};
use market_core::value_objects::{Page, PageRequest, Snowflake};

pub use unit_of_work::MemoryUnitOfWork;

#[derive(Debug, Clone)]
struct UserRow {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<Snowflake, UserRow>,
    items: BTreeMap<Snowflake, Item>,
    transactions: BTreeMap<Snowflake, Transaction>,
    chats: BTreeMap<Snowflake, ChatMessage>,
}

impl State {
    /// Remove an item and every row hanging off it
    fn remove_item_cascade(&mut self, item_id: Snowflake) -> bool {
        self.transactions.retain(|_, t| t.item_id != item_id);
        self.chats.retain(|_, c| c.item_id != item_id);
        self.items.remove(&item_id).is_some()
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    gate: Arc<tokio::sync::Mutex<()>>,
    #[cfg(any(test, feature = "testing"))]
    fail_next_swap: AtomicBool,
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(not(any(test, feature = "testing")))]
    fn take_swap_failure(&self) -> bool {
        false
    }
}

/// Fault injection and raw reads for tests, behind the `testing` feature
#[cfg(any(test, feature = "testing"))]
impl MemoryStore {
    /// Make the next availability swap inside a unit of work fail with a
    /// database error, to exercise rollback paths
    pub fn fail_next_swap(&self) {
        self.inner.fail_next_swap.store(true, Ordering::SeqCst);
    }

    fn take_swap_failure(&self) -> bool {
        self.inner.fail_next_swap.swap(false, Ordering::SeqCst)
    }

    /// Every stored transaction
    pub fn snapshot_transactions(&self) -> Vec<Transaction> {
        self.inner.state.lock().transactions.values().cloned().collect()
    }

    /// Item row regardless of soft deletion
    pub fn raw_item(&self, id: Snowflake) -> Option<Item> {
        self.inner.state.lock().items.get(&id).cloned()
    }
}

/// Sort is the caller's job; this only slices
fn paginate<T>(rows: Vec<T>, page: PageRequest) -> Page<T> {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page::new(items, total, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_slices_and_counts() {
        let rows: Vec<i32> = (1..=25).collect();
        let page = paginate(rows.clone(), PageRequest::new(Some(3), Some(10)));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages(), 3);

        let beyond = paginate(rows, PageRequest::new(Some(9), Some(10)));
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 25);
    }
}
