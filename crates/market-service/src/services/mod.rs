//! Business logic services
//!
//! Each service borrows a [`ServiceContext`] and exposes one operation per
//! use case. Authorization happens here, against the [`market_core::Caller`]
//! handed in by the transport layer.

pub mod auth;
pub mod chat;
pub mod context;
pub mod error;
pub mod item;
pub mod transaction;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthService;
pub use chat::{ChatService, CONVERSATION_PAGE_SIZE};
pub use context::{ServiceContext, ServiceContextBuilder, UploadLimits};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use item::ItemService;
pub use transaction::TransactionService;
pub use user::UserService;
