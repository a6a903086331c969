//! Transaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for transactions table
#[derive(Debug, Clone, FromRow)]
pub struct TransactionModel {
    pub id: i64,
    pub item_id: i64,
    pub buyer_id: i64,
    pub status: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
