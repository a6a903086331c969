//! Item database model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database model for items table
#[derive(Debug, Clone, FromRow)]
pub struct ItemModel {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub price: Decimal,
    pub category: String,
    pub description: String,
    pub image_url: Option<String>,
    pub status: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// `RETURNING status, version` of a guarded status write
#[derive(Debug, Clone, FromRow)]
pub struct AvailabilityRow {
    pub status: String,
    pub version: i64,
}
