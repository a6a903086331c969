//! Route definitions
//!
//! Everything except health and local uploads lives under `/api/v1`.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use market_common::{StorageBackend, StorageConfig};
use tower_http::services::ServeDir;

use crate::handlers::{auth, chats, health, items, transactions, users};
use crate::state::AppState;

/// Room for multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// API router without health routes, which get their own middleware
pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes(max_upload_bytes))
}

/// Health routes, mounted outside the rate limiter
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Files written by the local image store, served under their public prefix.
///
/// `None` for the bucket backend, or when the prefix is an absolute URL
/// pointing somewhere else.
pub fn upload_routes(storage: &StorageConfig) -> Option<Router<AppState>> {
    if storage.backend != StorageBackend::Local {
        return None;
    }
    let prefix = storage.public_base_url.trim_end_matches('/');
    if !prefix.starts_with('/') {
        return None;
    }
    Some(Router::new().nest_service(prefix, ServeDir::new(&storage.upload_dir)))
}

fn api_v1_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(item_routes(max_upload_bytes))
        .merge(transaction_routes())
        .merge(chat_routes())
        .merge(admin_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::get_current_user))
        .route(
            "/users/:user_id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}

fn item_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/mine", get(items::list_my_items))
        .route("/items/seller/:user_id", get(items::list_seller_items))
        .route(
            "/items/:item_id",
            get(items::get_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .route("/items/:item_id/status", patch(items::update_item_status))
        .route(
            "/items/:item_id/image",
            post(items::upload_item_image)
                .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
}

fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route("/transactions/purchases", get(transactions::list_purchases))
        .route("/transactions/sales", get(transactions::list_sales))
        .route(
            "/transactions/:transaction_id",
            get(transactions::get_transaction).delete(transactions::delete_transaction),
        )
        .route(
            "/transactions/:transaction_id/status",
            patch(transactions::update_transaction_status),
        )
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chats", post(chats::send_chat))
        .route("/chats/partners", get(chats::list_partners))
        .route("/chats/conversation", get(chats::get_conversation))
        .route("/chats/item/:item_id", get(chats::list_item_chats))
        .route(
            "/chats/:chat_id",
            get(chats::get_chat).delete(chats::delete_chat),
        )
        .route("/chats/:chat_id/read", patch(chats::mark_chat_read))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/items/:item_id", delete(items::hard_delete_item))
        .route("/admin/users/:user_id", delete(users::hard_delete_user))
}
