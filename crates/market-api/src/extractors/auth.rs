//! Authentication extractor
//!
//! Turns a bearer access token into the [`Caller`] capability services expect.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use market_core::{Caller, Snowflake};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated caller extracted from a JWT access token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Caller);

impl AuthUser {
    pub fn caller(&self) -> Caller {
        self.0
    }

    pub fn user_id(&self) -> Snowflake {
        self.0.user_id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        let claims = app_state
            .jwt_service()
            .validate_access_token(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected access token");
                ApiError::InvalidToken
            })?;

        let caller = claims.caller().map_err(|e| {
            tracing::warn!(error = %e, "Malformed subject in access token");
            ApiError::InvalidToken
        })?;

        Ok(AuthUser(caller))
    }
}
