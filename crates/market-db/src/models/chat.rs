//! Chat message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for chats table
#[derive(Debug, Clone, FromRow)]
pub struct ChatModel {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub item_id: i64,
    pub body: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}
