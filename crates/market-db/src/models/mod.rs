//! Database models - SQLx-compatible structs for PostgreSQL tables

mod chat;
mod item;
mod transaction;
mod user;

pub use chat::ChatModel;
pub use item::{AvailabilityRow, ItemModel};
pub use transaction::TransactionModel;
pub use user::UserModel;
