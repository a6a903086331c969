//! Request bodies and typed views of API responses

use std::sync::OnceLock;

use market_core::SnowflakeGenerator;
use serde::{Deserialize, Serialize};

pub const TEST_PASSWORD: &str = "Integration1";

/// Unique across runs against the same database
pub fn unique_suffix() -> String {
    static IDS: OnceLock<SnowflakeGenerator> = OnceLock::new();
    IDS.get_or_init(|| SnowflakeGenerator::new(1001)).generate().to_string()
}

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn unique(name: &str) -> Self {
        Self {
            name: name.to_string(),
            email: format!("{name}.{}@example.com", unique_suffix()),
            password: TEST_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            email: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct CreateItemRequest {
    pub title: String,
    pub price: String,
    pub category: String,
    pub description: Option<String>,
}

impl CreateItemRequest {
    pub fn bicycle() -> Self {
        Self {
            title: format!("Bicycle {}", unique_suffix()),
            price: "150.00".to_string(),
            category: "other".to_string(),
            description: Some("Single speed, new tyres".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub price: String,
    pub status: String,
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionResponse {
    pub id: String,
    pub item: ItemSummary,
    pub buyer_id: String,
    pub seller_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub is_read: bool,
}

#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: i64,
    pub total_pages: i64,
}
