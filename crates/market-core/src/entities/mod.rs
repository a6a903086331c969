//! Domain entities - core business objects

mod chat;
mod item;
mod transaction;
mod user;

pub use chat::ChatMessage;
pub use item::{validate_price, Category, Item, ItemChanges, ItemDraft};
pub use transaction::{Transaction, TransactionStatus};
pub use user::{normalize_email, Role, User, UserChanges};
