//! Response types and error handling for API endpoints
//!
//! Every failure leaves as `{"error": {"code", "message", "details?"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use market_common::AppError;
use market_service::ServiceError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

const OPAQUE_MESSAGE: &str = "Internal server error";

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Invalid or expired access token")]
    InvalidToken,

    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let raw = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Validation(_)
            | Self::InvalidPath(_)
            | Self::InvalidQuery(_)
            | Self::InvalidBody(_) => 400,
            Self::MissingAuth | Self::InvalidToken => 401,
            Self::PayloadTooLarge => 413,
            Self::Internal(_) => 500,
        };
        StatusCode::from_u16(raw).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::InvalidQuery(_) => "INVALID_QUERY_PARAMETER",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::MissingAuth => "MISSING_AUTHORIZATION",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // server-side detail stays in the log
        let (code, message) = if status.is_server_error() {
            error!(error = ?self, "Server error occurred");
            ("INTERNAL_ERROR".to_string(), OPAQUE_MESSAGE.to_string())
        } else {
            (self.error_code().to_string(), self.to_string())
        };

        let details = if let Self::Validation(errors) = &self {
            serde_json::to_value(errors).ok()
        } else {
            None
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Created response (201) with JSON body
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        *response.status_mut() = StatusCode::CREATED;
        response
    }
}

/// No content response (204)
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use market_core::{DomainError, Snowflake};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingAuth.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::invalid_path("x").status_code(), StatusCode::BAD_REQUEST);

        let pending: ApiError = ServiceError::from(DomainError::ItemAlreadyPending).into();
        assert_eq!(pending.status_code(), StatusCode::CONFLICT);
        assert_eq!(pending.error_code(), "ITEM_ALREADY_PENDING");

        let missing: ApiError = ServiceError::from(DomainError::ItemNotFound(Snowflake::new(4))).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_client_errors_keep_their_message() {
        let err: ApiError = ServiceError::from(DomainError::SelfPurchase).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "SELF_PURCHASE");
        assert_eq!(json["error"]["message"], "Buyer cannot purchase their own item");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_server_errors_are_opaque() {
        let err: ApiError =
            ServiceError::from(DomainError::DatabaseError("relation \"items\" missing".into())).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"]["message"], OPAQUE_MESSAGE);
    }
}
