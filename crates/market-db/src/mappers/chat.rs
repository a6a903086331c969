//! Chat model -> entity

use market_core::entities::ChatMessage;
use market_core::value_objects::Snowflake;

use crate::models::ChatModel;

impl From<ChatModel> for ChatMessage {
    fn from(model: ChatModel) -> Self {
        ChatMessage {
            id: Snowflake::new(model.id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            item_id: Snowflake::new(model.item_id),
            body: model.body,
            is_read: model.is_read,
            sent_at: model.sent_at,
        }
    }
}
