//! Authentication service
//!
//! Registration, login and token refresh. Tokens are stateless; there is no
//! server-side session to revoke.

use market_common::AppError;
use market_core::entities::User;
use market_core::DomainError;
use tracing::instrument;
use validator::Validate;

use crate::dto::{
    AuthResponse, CurrentUserResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new account with the `user` role
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        request.validate()?;

        if self.ctx.user_repo().email_exists(&request.email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }
        let password_hash = self.ctx.password_service().hash_new(&request.password)?;

        let mut user = User::new(self.ctx.generate_id(), &request.name, &request.email)?;
        user.phone = request.phone.filter(|p| !p.trim().is_empty());
        user.address = request.address.filter(|a| !a.trim().is_empty());

        self.ctx.user_repo().create(&user, &password_hash).await?;

        self.issue(&user)
    }

    /// Exchange credentials for a token pair
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        request.validate()?;

        let user = self
            .ctx
            .user_repo()
            .find_by_email(&request.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        self.ctx
            .password_service()
            .verify_or_error(&request.password, &hash)?;

        self.issue(&user)
    }

    /// Trade a refresh token for a fresh pair
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<AuthResponse> {
        let claims = self
            .ctx
            .jwt_service()
            .validate_refresh_token(&request.refresh_token)?;

        // role comes from the store, not the old token
        let user = self
            .ctx
            .user_repo()
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or(AppError::InvalidToken)?;

        self.issue(&user)
    }

    fn issue(&self, user: &User) -> ServiceResult<AuthResponse> {
        let pair = self.ctx.jwt_service().generate_token_pair(user.id, user.role)?;
        Ok(AuthResponse::new(
            pair.access_token,
            pair.refresh_token,
            pair.expires_in,
            CurrentUserResponse::from(user),
        ))
    }
}
