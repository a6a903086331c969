//! Item listing endpoints

use axum::{extract::State, Json};
use market_core::{traits::ItemQuery, Category, ItemStatus};
use market_service::dto::{
    ApiResponse, CreateItemRequest, ImageUploadResponse, ItemResponse, PaginatedResponse,
    UpdateItemRequest, UpdateItemStatusRequest,
};
use market_service::{ItemService, ServiceError};
use serde::Deserialize;

use crate::extractors::{
    ApiJson, ApiQuery, AuthUser, IdPath, ImageUpload, Pagination, PaginationParams, ValidatedJson,
};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// `?search=&category=&status=&page=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct ItemListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ItemListQuery {
    fn into_parts(self) -> Result<(ItemQuery, PaginationParams), ServiceError> {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        let mut query = ItemQuery {
            search: non_blank(self.search),
            ..ItemQuery::default()
        };
        if let Some(category) = non_blank(self.category) {
            query.category = Some(category.parse::<Category>()?);
        }
        if let Some(status) = non_blank(self.status) {
            query.status = status.parse::<ItemStatus>()?;
        }

        let page = PaginationParams {
            page: self.page,
            limit: self.limit,
        };
        Ok((query, page))
    }
}

/// GET /items
pub async fn list_items(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ItemListQuery>,
) -> ApiResult<Json<PaginatedResponse<ItemResponse>>> {
    let (query, page) = params.into_parts()?;
    let items = ItemService::new(state.service_context())
        .list(query, page.page_request())
        .await?;
    Ok(Json(items))
}

/// GET /items/:item_id
pub async fn get_item(
    State(state): State<AppState>,
    IdPath(item_id): IdPath,
) -> ApiResult<Json<ApiResponse<ItemResponse>>> {
    let item = ItemService::new(state.service_context()).get(item_id).await?;
    Ok(Json(ApiResponse::new(item)))
}

/// GET /items/seller/:user_id
pub async fn list_seller_items(
    State(state): State<AppState>,
    IdPath(seller_id): IdPath,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<ItemResponse>>> {
    let items = ItemService::new(state.service_context())
        .list_by_owner(seller_id, page)
        .await?;
    Ok(Json(items))
}

/// GET /items/mine
pub async fn list_my_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<ItemResponse>>> {
    let items = ItemService::new(state.service_context())
        .list_by_owner(auth.user_id(), page)
        .await?;
    Ok(Json(items))
}

/// POST /items
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateItemRequest>,
) -> ApiResult<Created<Json<ApiResponse<ItemResponse>>>> {
    let item = ItemService::new(state.service_context())
        .create(auth.caller(), request)
        .await?;
    Ok(Created(Json(ApiResponse::new(item))))
}

/// PATCH /items/:item_id
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(item_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateItemRequest>,
) -> ApiResult<Json<ApiResponse<ItemResponse>>> {
    let item = ItemService::new(state.service_context())
        .update_fields(auth.caller(), item_id, request)
        .await?;
    Ok(Json(ApiResponse::new(item)))
}

/// PATCH /items/:item_id/status
pub async fn update_item_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(item_id): IdPath,
    ApiJson(request): ApiJson<UpdateItemStatusRequest>,
) -> ApiResult<Json<ApiResponse<ItemResponse>>> {
    let item = ItemService::new(state.service_context())
        .set_status(auth.caller(), item_id, &request.status)
        .await?;
    Ok(Json(ApiResponse::new(item)))
}

/// DELETE /items/:item_id
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(item_id): IdPath,
) -> ApiResult<NoContent> {
    ItemService::new(state.service_context())
        .delete(auth.caller(), item_id)
        .await?;
    Ok(NoContent)
}

/// DELETE /admin/items/:item_id
pub async fn hard_delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(item_id): IdPath,
) -> ApiResult<NoContent> {
    ItemService::new(state.service_context())
        .hard_delete(auth.caller(), item_id)
        .await?;
    tracing::info!(item_id = %item_id, admin_id = %auth.user_id(), "Item hard deleted");
    Ok(NoContent)
}

/// POST /items/:item_id/image
pub async fn upload_item_image(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(item_id): IdPath,
    upload: ImageUpload,
) -> ApiResult<Json<ApiResponse<ImageUploadResponse>>> {
    let size = upload.data.len();
    let uploaded = ItemService::new(state.service_context())
        .upload_image(auth.caller(), item_id, &upload.content_type, upload.data)
        .await?;
    tracing::info!(
        item_id = %item_id,
        bytes = size,
        content_type = %upload.content_type,
        "Item image stored"
    );
    Ok(Json(ApiResponse::new(uploaded)))
}
