//! # market-db
//!
//! Storage layer implementing the market-core ports.
//!
//! ## Overview
//!
//! - [`repositories`]: PostgreSQL repositories and unit of work via SQLx
//! - [`memory`]: an in-process backend with the same atomicity guarantees
//! - [`pool`]: connection pool creation and migrations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_db::pool::{create_pool, PoolConfig};
//! use market_db::repositories::PgItemRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new("postgres://localhost/market")).await?;
//!     let items = PgItemRepository::new(pool);
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgChatRepository, PgItemRepository, PgTransactionRepository, PgUnitOfWork,
    PgUnitOfWorkFactory, PgUserRepository,
};
