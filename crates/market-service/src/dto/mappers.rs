//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use market_core::entities::{ChatMessage, Item, Transaction, User};

use super::responses::{
    ChatResponse, CurrentUserResponse, ItemResponse, ItemSummary, TransactionResponse,
    UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<&User> for CurrentUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Item Mappers
// ============================================================================

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            owner_id: item.owner_id.to_string(),
            title: item.title.clone(),
            price: item.price,
            category: item.category,
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            status: item.status,
            version: item.version,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self::from(&item)
    }
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            price: item.price,
            owner_id: item.owner_id.to_string(),
            status: item.status,
        }
    }
}

// ============================================================================
// Transaction Mappers
// ============================================================================

/// A transaction together with the item it refers to
#[derive(Debug, Clone)]
pub struct TransactionWithItem {
    pub transaction: Transaction,
    pub item: Item,
}

impl From<TransactionWithItem> for TransactionResponse {
    fn from(value: TransactionWithItem) -> Self {
        let TransactionWithItem { transaction, item } = value;
        Self {
            id: transaction.id.to_string(),
            seller_id: item.owner_id.to_string(),
            item: ItemSummary::from(&item),
            buyer_id: transaction.buyer_id.to_string(),
            status: transaction.status,
            occurred_at: transaction.occurred_at,
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }
}

// ============================================================================
// Chat Mappers
// ============================================================================

impl From<ChatMessage> for ChatResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender_id.to_string(),
            receiver_id: message.receiver_id.to_string(),
            item_id: message.item_id.to_string(),
            body: message.body,
            is_read: message.is_read,
            sent_at: message.sent_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::entities::ItemDraft;
    use market_core::Snowflake;
    use rust_decimal::Decimal;

    #[test]
    fn test_transaction_response_names_the_seller() {
        let draft = ItemDraft::parse("Chair", Decimal::new(2500, 2), "furniture", None).unwrap();
        let item = Item::list(Snowflake::new(5), Snowflake::new(50), draft);
        let transaction = Transaction::open(Snowflake::new(9), item.id, Snowflake::new(60));

        let response = TransactionResponse::from(TransactionWithItem { transaction, item });
        assert_eq!(response.seller_id, "50");
        assert_eq!(response.buyer_id, "60");
        assert_eq!(response.item.id, "5");
        assert_eq!(response.item.price.to_string(), "25.00");
    }
}
