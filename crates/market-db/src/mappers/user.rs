//! User model -> entity

use market_core::entities::User;
use market_core::error::DomainError;
use market_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::UserModel;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: Snowflake::new(model.id),
            name: model.name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            role: parse_column("role", &model.role)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}
