//! Shared fixtures for service tests

use std::sync::Arc;

use market_common::auth::JwtService;
use market_core::entities::{Item, ItemDraft, User};
use market_core::traits::{ItemRepository, UserRepository};
use market_core::{Caller, Role, SnowflakeGenerator};
use market_db::MemoryStore;
use market_storage::MemoryImageStore;
use rust_decimal::Decimal;

use super::context::ServiceContext;

pub(crate) const TEST_SECRET: &str = "test-secret-key-for-service-tests";

/// A service context over a fresh in-memory backend
pub(crate) struct Harness {
    pub store: MemoryStore,
    pub images: MemoryImageStore,
    pub ctx: ServiceContext,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let images = MemoryImageStore::new();
        let ctx = ServiceContext::builder()
            .memory(&store)
            .image_store(Arc::new(images.clone()))
            .jwt_service(Arc::new(JwtService::new(TEST_SECRET, 900, 604_800)))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(7)))
            .build()
            .unwrap();
        Self { store, images, ctx }
    }
}

/// Insert a plain user and return their caller capability
pub(crate) async fn new_user(h: &Harness, name: &str) -> Caller {
    let id = h.ctx.generate_id();
    let user = User::new(id, name, &format!("{name}.{id}@example.com")).unwrap();
    UserRepository::create(&h.store, &user, "not-a-real-hash").await.unwrap();
    Caller::new(id, Role::User)
}

/// Insert an admin and return their caller capability
pub(crate) async fn new_admin(h: &Harness) -> Caller {
    let id = h.ctx.generate_id();
    let mut user = User::new(id, "admin", &format!("admin.{id}@example.com")).unwrap();
    user.role = Role::Admin;
    UserRepository::create(&h.store, &user, "not-a-real-hash").await.unwrap();
    Caller::admin(id)
}

/// List an Available item owned by `owner`
pub(crate) async fn new_item(h: &Harness, owner: Caller) -> Item {
    let draft = ItemDraft::parse("Road bike", Decimal::new(25_000, 2), "other", Some("fast")).unwrap();
    let item = Item::list(h.ctx.generate_id(), owner.user_id, draft);
    ItemRepository::create(&h.store, &item).await.unwrap();
    item
}
