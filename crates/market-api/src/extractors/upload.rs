//! Multipart image upload extractor

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::StatusCode,
};

use crate::response::ApiError;

/// Form field carrying the file
pub const IMAGE_FIELD: &str = "image";

/// The `image` part of a multipart body
#[derive(Debug)]
pub struct ImageUpload {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[async_trait]
impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(IMAGE_FIELD) {
                continue;
            }
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            return Ok(ImageUpload {
                content_type,
                data: data.to_vec(),
            });
        }

        Err(ApiError::invalid_body(format!("missing `{IMAGE_FIELD}` field")))
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::invalid_body(err.body_text())
    }
}
