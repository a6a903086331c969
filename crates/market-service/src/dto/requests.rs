//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Enum-valued fields (category, status) stay strings here and are parsed by
//! the domain so unknown values surface as domain validation errors.

use market_core::Snowflake;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,
}

/// User login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

// ============================================================================
// User Requests
// ============================================================================

/// Partial profile update; absent or empty fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,

    pub password: Option<String>,
}

// ============================================================================
// Item Requests
// ============================================================================

/// New listing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    pub price: Decimal,

    pub category: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
}

/// Partial listing update; a zero price or blank string means "unchanged"
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(max = 100, message = "Title must be at most 100 characters"))]
    pub title: Option<String>,

    pub price: Option<Decimal>,

    pub category: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
}

/// Owner-set status: `available`, `sold` or `removed`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemStatusRequest {
    pub status: String,
}

// ============================================================================
// Transaction Requests
// ============================================================================

/// Purchase an item
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionRequest {
    pub item_id: Snowflake,
}

/// Target status: `completed` or `cancelled`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTransactionStatusRequest {
    pub status: String,
}

// ============================================================================
// Chat Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendChatRequest {
    pub receiver_id: Snowflake,

    pub item_id: Snowflake,

    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Dewi".to_string(),
            email: "dewi@example.com".to_string(),
            password: "Passw0rd!".to_string(),
            phone: None,
            address: None,
        };
        assert!(valid.validate().is_ok());

        let invalid_email = RegisterRequest {
            email: "invalid-email".to_string(),
            ..valid.clone()
        };
        assert!(invalid_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_create_item_request_from_json() {
        let request: CreateItemRequest = serde_json::from_str(
            r#"{"title":"Bike","price":"120.50","category":"other","description":"red"}"#,
        )
        .unwrap();
        assert_eq!(request.price, Decimal::new(12050, 2));
        assert!(request.validate().is_ok());

        let empty_title = CreateItemRequest {
            title: String::new(),
            ..request
        };
        assert!(empty_title.validate().is_err());
    }

    #[test]
    fn test_ids_accept_strings_and_numbers() {
        let from_str: CreateTransactionRequest =
            serde_json::from_str(r#"{"item_id":"42"}"#).unwrap();
        let from_num: CreateTransactionRequest = serde_json::from_str(r#"{"item_id":42}"#).unwrap();
        assert_eq!(from_str.item_id, from_num.item_id);
    }

    #[test]
    fn test_chat_body_length() {
        let request = SendChatRequest {
            receiver_id: Snowflake::new(1),
            item_id: Snowflake::new(2),
            body: "x".repeat(2001),
        };
        assert!(request.validate().is_err());
    }
}
