//! Transaction model -> entity

use market_core::entities::Transaction;
use market_core::error::DomainError;
use market_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::TransactionModel;

impl TryFrom<TransactionModel> for Transaction {
    type Error = DomainError;

    fn try_from(model: TransactionModel) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: Snowflake::new(model.id),
            item_id: Snowflake::new(model.item_id),
            buyer_id: Snowflake::new(model.buyer_id),
            status: parse_column("status", &model.status)?,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
