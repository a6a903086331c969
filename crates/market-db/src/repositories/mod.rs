//! Repository implementations
//!
//! PostgreSQL implementations of the ports defined in market-core.

mod chat;
mod error;
mod item;
mod transaction;
mod unit_of_work;
mod user;

pub use chat::PgChatRepository;
pub use error::{like_pattern, map_db_error};
pub use item::PgItemRepository;
pub use transaction::PgTransactionRepository;
pub use unit_of_work::{PgUnitOfWork, PgUnitOfWorkFactory};
pub use user::PgUserRepository;
