//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Item not found: {0}")]
    ItemNotFound(Snowflake),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Snowflake),

    #[error("Chat message not found: {0}")]
    ChatNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Price must be greater than zero with at most two decimal places")]
    InvalidPrice,

    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Cannot send a message to yourself")]
    SelfMessage,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Only the item owner may do this")]
    NotItemOwner,

    #[error("Only the buyer or the seller may access this transaction")]
    NotTransactionParticipant,

    #[error("Only the seller may delete this transaction")]
    NotSeller,

    #[error("Buyer cannot purchase their own item")]
    SelfPurchase,

    #[error("Messages about an item must involve its owner")]
    ChatNotPermitted,

    #[error("Not a participant of this chat message")]
    NotChatParticipant,

    #[error("Administrator role required")]
    AdminOnly,

    #[error("Cannot act on another user's account")]
    NotAccountOwner,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Item is not available")]
    ItemNotAvailable,

    #[error("Item already has a pending transaction")]
    ItemAlreadyPending,

    #[error("Transaction is already {0}")]
    TransactionAlreadyTerminal(&'static str),

    #[error("Item changed concurrently, reload and retry")]
    StaleItemVersion,

    #[error("Email already in use")]
    EmailAlreadyExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ItemNotFound(_) => "UNKNOWN_ITEM",
            Self::TransactionNotFound(_) => "UNKNOWN_TRANSACTION",
            Self::ChatNotFound(_) => "UNKNOWN_CHAT",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::SelfMessage => "SELF_MESSAGE",

            // Authorization
            Self::NotItemOwner => "NOT_ITEM_OWNER",
            Self::NotTransactionParticipant => "NOT_TRANSACTION_PARTICIPANT",
            Self::NotSeller => "NOT_SELLER",
            Self::SelfPurchase => "SELF_PURCHASE",
            Self::ChatNotPermitted => "CHAT_NOT_PERMITTED",
            Self::NotChatParticipant => "NOT_CHAT_PARTICIPANT",
            Self::AdminOnly => "ADMIN_ONLY",
            Self::NotAccountOwner => "NOT_ACCOUNT_OWNER",

            // Conflict
            Self::ItemNotAvailable => "ITEM_NOT_AVAILABLE",
            Self::ItemAlreadyPending => "ITEM_ALREADY_PENDING",
            Self::TransactionAlreadyTerminal(_) => "TRANSACTION_TERMINAL",
            Self::StaleItemVersion => "STALE_ITEM_VERSION",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ItemNotFound(_)
                | Self::TransactionNotFound(_)
                | Self::ChatNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidPrice
                | Self::InvalidCategory(_)
                | Self::WeakPassword(_)
                | Self::SelfMessage
        )
    }

    /// Check if this is an authorization (forbidden) error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotItemOwner
                | Self::NotTransactionParticipant
                | Self::NotSeller
                | Self::SelfPurchase
                | Self::ChatNotPermitted
                | Self::NotChatParticipant
                | Self::AdminOnly
                | Self::NotAccountOwner
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ItemNotAvailable
                | Self::ItemAlreadyPending
                | Self::TransactionAlreadyTerminal(_)
                | Self::StaleItemVersion
                | Self::EmailAlreadyExists
        )
    }

    /// Infrastructure failures surface as opaque internal errors
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::StorageError(_) | Self::InternalError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::ItemNotFound(Snowflake::new(1)).code(), "UNKNOWN_ITEM");
        assert_eq!(DomainError::ItemAlreadyPending.code(), "ITEM_ALREADY_PENDING");
        assert_eq!(
            DomainError::TransactionAlreadyTerminal("completed").code(),
            "TRANSACTION_TERMINAL"
        );
    }

    #[test]
    fn test_every_variant_has_exactly_one_kind() {
        let samples = [
            DomainError::UserNotFound(Snowflake::new(1)),
            DomainError::ValidationError("x".into()),
            DomainError::InvalidPrice,
            DomainError::NotItemOwner,
            DomainError::SelfPurchase,
            DomainError::ItemNotAvailable,
            DomainError::StaleItemVersion,
            DomainError::DatabaseError("boom".into()),
        ];

        for err in &samples {
            let kinds = [
                err.is_not_found(),
                err.is_validation(),
                err.is_authorization(),
                err.is_conflict(),
                err.is_internal(),
            ];
            assert_eq!(kinds.iter().filter(|k| **k).count(), 1, "{err:?}");
        }
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::TransactionNotFound(Snowflake::new(55));
        assert_eq!(err.to_string(), "Transaction not found: 55");

        let err = DomainError::TransactionAlreadyTerminal("cancelled");
        assert_eq!(err.to_string(), "Transaction is already cancelled");
    }
}
