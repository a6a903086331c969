//! Axum extractors for request handling

mod auth;
mod query;
mod upload;
mod validated;

pub use auth::AuthUser;
pub use query::{ApiQuery, IdPath, Pagination, PaginationParams};
pub use upload::{ImageUpload, IMAGE_FIELD};
pub use validated::{ApiJson, ValidatedJson};
