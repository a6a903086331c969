//! Blob storage for item images

use async_trait::async_trait;

use super::RepoResult;

/// Where an uploaded image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

/// Object storage collaborator.
///
/// Failures are reported as [`DomainError::StorageError`](crate::DomainError::StorageError).
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `data` under `key` and return a stable public URL
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> RepoResult<StoredImage>;

    /// Remove a stored object. Missing keys are not an error.
    async fn delete(&self, key: &str) -> RepoResult<()>;

    /// Cheap reachability check for readiness probes
    async fn ping(&self) -> RepoResult<()>;
}
