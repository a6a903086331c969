//! # market-storage
//!
//! [`ImageStore`](market_core::ImageStore) implementations:
//!
//! - [`LocalImageStore`]: files under a directory served at a public prefix
//! - [`HttpImageStore`]: a remote bucket reached over its REST API
//! - [`MemoryImageStore`]: a map in process memory, for tests

mod http;
mod local;
mod memory;

use std::sync::Arc;

use market_common::{StorageBackend, StorageConfig};
use market_core::ImageStore;

pub use http::HttpImageStore;
pub use local::LocalImageStore;
pub use memory::MemoryImageStore;

/// Build the store selected by `storage.backend`
pub fn from_config(config: &StorageConfig) -> Arc<dyn ImageStore> {
    match config.backend {
        StorageBackend::Local => Arc::new(LocalImageStore::new(
            &config.upload_dir,
            &config.public_base_url,
        )),
        StorageBackend::Bucket => Arc::new(HttpImageStore::new(
            &config.bucket.endpoint,
            &config.bucket.project_id,
            &config.bucket.bucket_id,
            &config.bucket.api_key,
        )),
    }
}
