//! In-process image store for tests and local runs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use market_core::{DomainError, ImageStore, RepoResult, StoredImage};

/// Keeps uploaded bytes in a map; URLs are `memory://{key}`
#[derive(Debug, Clone, Default)]
pub struct MemoryImageStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(&self, key: &str, _content_type: &str, data: Vec<u8>) -> RepoResult<StoredImage> {
        if key.is_empty() {
            return Err(DomainError::StorageError("empty object key".into()));
        }
        self.objects.lock().insert(key.to_string(), data);
        Ok(StoredImage {
            key: key.to_string(),
            url: format!("memory://{key}"),
        })
    }

    async fn delete(&self, key: &str) -> RepoResult<()> {
        self.objects.lock().remove(key);
        Ok(())
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}
