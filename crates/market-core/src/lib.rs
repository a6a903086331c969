//! # market-core
//!
//! Domain layer containing entities, value objects, and the ports the
//! infrastructure crates implement (repositories, unit of work, image store).
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    normalize_email, validate_price, Category, ChatMessage, Item, ItemChanges, ItemDraft, Role,
    Transaction, TransactionStatus, User, UserChanges,
};
pub use error::DomainError;
pub use traits::{
    ChatRepository, ImageStore, ItemQuery, ItemRepository, RepoResult, StoredImage,
    TransactionRepository, UnitOfWork, UnitOfWorkFactory, UserRepository,
};
pub use value_objects::{
    Availability, Caller, ItemStatus, Page, PageRequest, Snowflake, SnowflakeGenerator,
    SnowflakeParseError,
};
