//! Remote bucket image store
//!
//! Talks to an Appwrite-compatible storage API:
//!
//! - upload: `POST {endpoint}/storage/buckets/{bucket}/files` (multipart `fileId` + `file`)
//! - view: `GET {endpoint}/storage/buckets/{bucket}/files/{fileId}/view?project={project}`
//! - delete: `DELETE {endpoint}/storage/buckets/{bucket}/files/{fileId}`

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use market_core::{DomainError, ImageStore, RepoResult, StoredImage};

/// Longest file id the storage API accepts
const MAX_FILE_ID_LEN: usize = 36;

#[derive(Clone)]
pub struct HttpImageStore {
    client: Client,
    endpoint: String,
    project_id: String,
    bucket_id: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    #[serde(rename = "$id")]
    id: String,
}

impl HttpImageStore {
    pub fn new(endpoint: &str, project_id: &str, bucket_id: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            bucket_id: bucket_id.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn files_url(&self) -> String {
        format!("{}/storage/buckets/{}/files", self.endpoint, self.bucket_id)
    }

    pub fn view_url(&self, file_id: &str) -> String {
        format!(
            "{}/{}/view?project={}",
            self.files_url(),
            file_id,
            self.project_id
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> RepoResult<reqwest::Response> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| DomainError::StorageError(e.to_string()))
    }
}

/// Bucket file ids are flat; the last key segment (minus extension) is used
pub fn file_id_for(key: &str) -> String {
    let path = Path::new(key);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(key);

    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .take(MAX_FILE_ID_LEN)
        .collect()
}

async fn rejected(response: reqwest::Response) -> DomainError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    DomainError::StorageError(format!("bucket responded {status}: {body}"))
}

#[async_trait]
impl ImageStore for HttpImageStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> RepoResult<StoredImage> {
        let file_id = file_id_for(key);
        let file_name = Path::new(key)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(key)
            .to_string();

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(|e| DomainError::StorageError(e.to_string()))?;
        let form = Form::new().text("fileId", file_id).part("file", part);

        let response = self
            .send(self.client.post(self.files_url()).multipart(form))
            .await?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let uploaded: UploadedFile = response
            .json()
            .await
            .map_err(|e| DomainError::StorageError(e.to_string()))?;

        Ok(StoredImage {
            url: self.view_url(&uploaded.id),
            key: uploaded.id,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> RepoResult<()> {
        let url = format!("{}/{}", self.files_url(), file_id_for(key));
        let response = self.send(self.client.delete(url)).await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            _ => Err(rejected(response).await),
        }
    }

    async fn ping(&self) -> RepoResult<()> {
        let url = format!("{}/storage/buckets/{}", self.endpoint, self.bucket_id);
        let response = self.send(self.client.get(url)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejected(response).await)
        }
    }
}

impl std::fmt::Debug for HttpImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageStore")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("bucket_id", &self.bucket_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
