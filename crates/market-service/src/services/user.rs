//! User service
//!
//! Profile reads and updates. Role is never writable from here.

use market_core::entities::UserChanges;
use market_core::{Caller, DomainError, PageRequest, Snowflake, User};
use tracing::instrument;
use validator::Validate;

use crate::dto::{CurrentUserResponse, PaginatedResponse, UpdateUserRequest, UserResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Public profile
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self.load(user_id).await?;
        Ok(UserResponse::from(&user))
    }

    /// The caller's own profile
    #[instrument(skip(self))]
    pub async fn me(&self, caller: Caller) -> ServiceResult<CurrentUserResponse> {
        let user = self.load(caller.user_id).await?;
        Ok(CurrentUserResponse::from(&user))
    }

    /// Search by name or email; admin only
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        caller: Caller,
        search: Option<&str>,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<CurrentUserResponse>> {
        if !caller.is_admin() {
            return Err(DomainError::AdminOnly.into());
        }
        let page = self.ctx.user_repo().list(search, page).await?;
        Ok(PaginatedResponse::from_page(page, |u| CurrentUserResponse::from(&u)))
    }

    /// Partial update of the caller's own profile
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        caller: Caller,
        user_id: Snowflake,
        request: UpdateUserRequest,
    ) -> ServiceResult<CurrentUserResponse> {
        if !caller.is(user_id) {
            return Err(DomainError::NotAccountOwner.into());
        }
        request.validate()?;

        let mut user = self.load(user_id).await?;
        let changes = UserChanges {
            name: request.name,
            email: request.email,
            phone: request.phone,
            address: request.address,
        };
        if let Some(email) = changes.apply(&mut user)? {
            if self.ctx.user_repo().email_exists(&email).await? {
                return Err(DomainError::EmailAlreadyExists.into());
            }
        }

        let new_hash = match request.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(self.ctx.password_service().hash_new(&password)?),
            None => None,
        };

        self.ctx
            .user_repo()
            .update(&user, new_hash.as_deref())
            .await?;

        Ok(CurrentUserResponse::from(&user))
    }

    /// Soft delete by the account holder or an admin
    #[instrument(skip(self))]
    pub async fn delete(&self, caller: Caller, user_id: Snowflake) -> ServiceResult<()> {
        if !caller.is(user_id) && !caller.is_admin() {
            return Err(DomainError::NotAccountOwner.into());
        }
        self.ctx.user_repo().soft_delete(user_id).await?;
        Ok(())
    }

    /// Remove the account and everything it owns; admin only
    #[instrument(skip(self))]
    pub async fn hard_delete(&self, caller: Caller, user_id: Snowflake) -> ServiceResult<()> {
        if !caller.is_admin() {
            return Err(DomainError::AdminOnly.into());
        }
        self.ctx.user_repo().hard_delete(user_id).await?;
        Ok(())
    }

    async fn load(&self, user_id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id).into())
    }
}
