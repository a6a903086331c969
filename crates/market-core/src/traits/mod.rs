//! Ports implemented by the infrastructure crates

mod image_store;
mod repositories;
mod unit_of_work;

pub use image_store::{ImageStore, StoredImage};
pub use repositories::{
    ChatRepository, ItemQuery, ItemRepository, RepoResult, TransactionRepository, UserRepository,
};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
