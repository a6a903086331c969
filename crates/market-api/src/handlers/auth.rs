//! Registration, login and token refresh

use axum::{extract::State, Json};
use market_service::dto::{
    ApiResponse, AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
};
use market_service::AuthService;

use crate::extractors::{ApiJson, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<Json<ApiResponse<AuthResponse>>>> {
    let response = AuthService::new(state.service_context())
        .register(request)
        .await?;
    tracing::info!(user_id = %response.user.id, "User registered");
    Ok(Created(Json(ApiResponse::new(response))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let response = AuthService::new(state.service_context()).login(request).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshTokenRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let response = AuthService::new(state.service_context())
        .refresh(request)
        .await?;
    Ok(Json(ApiResponse::new(response)))
}
