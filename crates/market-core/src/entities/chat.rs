//! Chat message entity - a note between two users about one item

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

pub const MAX_BODY_LEN: usize = 2000;

/// Chat message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub item_id: Snowflake,
    pub body: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Compose a message, enforcing body length and distinct parties.
    ///
    /// Whether the item's owner is one of the parties is checked by the
    /// caller against a fresh read of the item.
    pub fn compose(
        id: Snowflake,
        sender_id: Snowflake,
        receiver_id: Snowflake,
        item_id: Snowflake,
        body: &str,
    ) -> Result<Self, DomainError> {
        if sender_id == receiver_id {
            return Err(DomainError::SelfMessage);
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(DomainError::ValidationError("message must not be empty".into()));
        }
        if body.chars().count() > MAX_BODY_LEN {
            return Err(DomainError::ValidationError(format!(
                "message must be at most {MAX_BODY_LEN} characters"
            )));
        }

        Ok(Self {
            id,
            sender_id,
            receiver_id,
            item_id,
            body: body.to_string(),
            is_read: false,
            sent_at: Utc::now(),
        })
    }

    #[inline]
    pub fn involves(&self, user_id: Snowflake) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The party that is not `user_id`
    pub fn counterpart_of(&self, user_id: Snowflake) -> Snowflake {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}
