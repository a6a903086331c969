//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use market_common::AppError;
use market_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Application error (auth, uploads, etc.)
    App(AppError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Authenticated but not allowed to touch this resource
    Forbidden { reason: String },

    /// Validation error
    Validation(String),

    /// Conflict (e.g., duplicate resource)
    Conflict(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Forbidden { reason } => write!(f, "Forbidden: {reason}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

/// The four failure kinds callers act on, plus everything else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Unauthorized,
    Internal,
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status_code() {
            400 | 413 | 415 => ErrorKind::Validation,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            _ => ErrorKind::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_authorization() {
                    403
                } else if e.is_validation() {
                    400
                } else if e.is_conflict() {
                    409
                } else {
                    500
                }
            }
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::Forbidden { .. } => 403,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Forbidden { .. } => AppError::InsufficientPermissions,
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Conflict(msg) => AppError::Conflict(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::Snowflake;

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("Item", 123);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("Item not found: 123"));
    }

    #[test]
    fn test_forbidden_error() {
        let err = ServiceError::forbidden("not the owner");
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_domain_kinds() {
        let cases = [
            (DomainError::ItemNotFound(Snowflake::new(1)), ErrorKind::NotFound),
            (DomainError::SelfPurchase, ErrorKind::Forbidden),
            (DomainError::ItemNotAvailable, ErrorKind::Conflict),
            (DomainError::TransactionAlreadyTerminal("completed"), ErrorKind::Conflict),
            (DomainError::InvalidPrice, ErrorKind::Validation),
            (DomainError::DatabaseError("down".into()), ErrorKind::Internal),
        ];
        for (domain, kind) in cases {
            assert_eq!(ServiceError::from(domain).kind(), kind);
        }
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        let err = ServiceError::from(AppError::TokenExpired);
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::not_found("Transaction", 456).into();
        assert_eq!(app_err.status_code(), 404);

        let app_err: AppError = ServiceError::from(DomainError::ItemAlreadyPending).into();
        assert_eq!(app_err.error_code(), "ITEM_ALREADY_PENDING");
    }
}
