//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use market_core::{ItemStatus, Page, Role, TransactionStatus};
use market_core::entities::Category;
use rust_decimal::Decimal;
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// One page of results with offset pagination metadata
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: i64,
    /// `ceil(total_items / limit)`
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page<E>(page: Page<E>, f: impl FnMut(E) -> T) -> Self {
        let pagination = PaginationMeta {
            page: page.request.page(),
            limit: page.request.limit(),
            total_items: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            data: page.items.into_iter().map(f).collect(),
            pagination,
        }
    }
}

// ============================================================================
// Auth Responses
// ============================================================================

/// Authentication response with tokens
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

impl AuthResponse {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        user: CurrentUserResponse,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

// ============================================================================
// User Responses
// ============================================================================

/// Public user profile
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Own profile (includes contact details)
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Item Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub price: Decimal,
    pub category: Category,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: ItemStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item fields embedded in transaction responses
#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub id: String,
    pub title: String,
    pub price: Decimal,
    pub owner_id: String,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUploadResponse {
    pub item_id: String,
    pub image_url: String,
}

// ============================================================================
// Transaction Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub item: ItemSummary,
    pub buyer_id: String,
    pub seller_id: String,
    pub status: TransactionStatus,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Chat Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub item_id: String,
    pub body: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub storage: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, storage_healthy: bool) -> Self {
        let label = |healthy: bool| if healthy { "healthy" } else { "unhealthy" }.to_string();
        Self {
            status: if database_healthy && storage_healthy {
                "ready"
            } else {
                "not_ready"
            }
            .to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: label(database_healthy),
                storage: label(storage_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
