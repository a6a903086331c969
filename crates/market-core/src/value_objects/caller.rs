//! Authenticated caller capability

use crate::entities::Role;
use crate::value_objects::Snowflake;

/// Identity and role of whoever invokes a service operation.
///
/// Built once at the boundary from a validated credential and passed into
/// every operation that needs an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Snowflake,
    pub role: Role,
}

impl Caller {
    pub const fn new(user_id: Snowflake, role: Role) -> Self {
        Self { user_id, role }
    }

    pub const fn user(user_id: Snowflake) -> Self {
        Self::new(user_id, Role::User)
    }

    pub const fn admin(user_id: Snowflake) -> Self {
        Self::new(user_id, Role::Admin)
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[inline]
    pub fn is(&self, user_id: Snowflake) -> bool {
        self.user_id == user_id
    }
}
