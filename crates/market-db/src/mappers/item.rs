//! Item model -> entity

use market_core::entities::Item;
use market_core::error::DomainError;
use market_core::value_objects::{Availability, Snowflake};

use super::parse_column;
use crate::models::{AvailabilityRow, ItemModel};

impl TryFrom<ItemModel> for Item {
    type Error = DomainError;

    fn try_from(model: ItemModel) -> Result<Self, Self::Error> {
        Ok(Item {
            id: Snowflake::new(model.id),
            owner_id: Snowflake::new(model.owner_id),
            title: model.title,
            price: model.price,
            category: parse_column("category", &model.category)?,
            description: model.description,
            image_url: model.image_url,
            status: parse_column("status", &model.status)?,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}

pub fn availability_from_row(row: AvailabilityRow) -> Result<Availability, DomainError> {
    Ok(Availability::new(parse_column("status", &row.status)?, row.version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use market_core::{Category, ItemStatus};
    use rust_decimal::Decimal;

    fn model(category: &str, status: &str) -> ItemModel {
        ItemModel {
            id: 1,
            owner_id: 2,
            title: "Bike".into(),
            price: Decimal::new(9_950, 2),
            category: category.into(),
            description: String::new(),
            image_url: None,
            status: status.into(),
            version: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_model_to_entity() {
        let item = Item::try_from(model("other", "sold")).unwrap();
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.availability(), Availability::new(ItemStatus::Sold, 4));
        assert_eq!(item.owner_id, Snowflake::new(2));
    }

    #[test]
    fn test_unknown_column_value_is_database_error() {
        assert!(matches!(
            Item::try_from(model("boats", "available")),
            Err(DomainError::DatabaseError(_))
        ));
        assert!(matches!(
            availability_from_row(AvailabilityRow {
                status: "lost".into(),
                version: 0
            }),
            Err(DomainError::DatabaseError(_))
        ));
    }
}
