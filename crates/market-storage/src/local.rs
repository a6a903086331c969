//! Filesystem image store

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use market_core::{DomainError, ImageStore, RepoResult, StoredImage};

/// Writes images below `root`; URLs are `{public_base_url}/{key}`
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl AsRef<Path>, public_base_url: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys are relative paths; anything that could escape `root` is rejected
    fn resolve(&self, key: &str) -> RepoResult<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(DomainError::StorageError(format!("invalid object key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

fn io_error(e: std::io::Error) -> DomainError {
    DomainError::StorageError(e.to_string())
}

#[async_trait]
impl ImageStore for LocalImageStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> RepoResult<StoredImage> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&path, data).await.map_err(io_error)?;

        Ok(StoredImage {
            key: key.to_string(),
            url: self.url_for(key),
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> RepoResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }

    async fn ping(&self) -> RepoResult<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(io_error)
    }
}
