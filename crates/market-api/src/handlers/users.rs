//! User profile endpoints

use axum::{extract::State, Json};
use market_service::dto::{
    ApiResponse, CurrentUserResponse, PaginatedResponse, UpdateUserRequest, UserResponse,
};
use market_service::UserService;
use serde::Deserialize;

use crate::extractors::{ApiQuery, AuthUser, IdPath, PaginationParams, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> ApiResult<Json<PaginatedResponse<CurrentUserResponse>>> {
    let page = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .page_request();
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let users = UserService::new(state.service_context())
        .list(auth.caller(), search, page)
        .await?;
    Ok(Json(users))
}

/// GET /users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<CurrentUserResponse>>> {
    let user = UserService::new(state.service_context()).me(auth.caller()).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// GET /users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    IdPath(user_id): IdPath,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = UserService::new(state.service_context()).get(user_id).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// PATCH /users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<CurrentUserResponse>>> {
    let user = UserService::new(state.service_context())
        .update(auth.caller(), user_id, request)
        .await?;
    Ok(Json(ApiResponse::new(user)))
}

/// DELETE /users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
) -> ApiResult<NoContent> {
    UserService::new(state.service_context())
        .delete(auth.caller(), user_id)
        .await?;
    Ok(NoContent)
}

/// DELETE /admin/users/:user_id
pub async fn hard_delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
) -> ApiResult<NoContent> {
    UserService::new(state.service_context())
        .hard_delete(auth.caller(), user_id)
        .await?;
    tracing::info!(user_id = %user_id, admin_id = %auth.user_id(), "User hard deleted");
    Ok(NoContent)
}
