//! Item-scoped chat endpoints

use axum::{extract::State, Json};
use market_core::Snowflake;
use market_service::dto::{ApiResponse, ChatResponse, PaginatedResponse, SendChatRequest, UserResponse};
use market_service::{ChatService, CONVERSATION_PAGE_SIZE};
use serde::Deserialize;

use crate::extractors::{ApiQuery, AuthUser, IdPath, Pagination, PaginationParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// `?user_id=&item_id=&page=&limit=`
#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub user_id: Snowflake,
    pub item_id: Snowflake,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /chats
pub async fn send_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendChatRequest>,
) -> ApiResult<Created<Json<ApiResponse<ChatResponse>>>> {
    let chat = ChatService::new(state.service_context())
        .send(auth.caller(), request)
        .await?;
    Ok(Created(Json(ApiResponse::new(chat))))
}

/// GET /chats/:chat_id
pub async fn get_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(chat_id): IdPath,
) -> ApiResult<Json<ApiResponse<ChatResponse>>> {
    let chat = ChatService::new(state.service_context())
        .get(auth.caller(), chat_id)
        .await?;
    Ok(Json(ApiResponse::new(chat)))
}

/// GET /chats/item/:item_id
pub async fn list_item_chats(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(item_id): IdPath,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<ChatResponse>>> {
    let chats = ChatService::new(state.service_context())
        .list_for_item(auth.caller(), item_id, page)
        .await?;
    Ok(Json(chats))
}

/// GET /chats/conversation
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ConversationQuery>,
) -> ApiResult<Json<PaginatedResponse<ChatResponse>>> {
    let page = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .page_request_with_default(CONVERSATION_PAGE_SIZE);
    let chats = ChatService::new(state.service_context())
        .conversation(auth.caller(), query.user_id, query.item_id, page)
        .await?;
    Ok(Json(chats))
}

/// GET /chats/partners
pub async fn list_partners(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let partners = ChatService::new(state.service_context())
        .partners(auth.caller())
        .await?;
    Ok(Json(ApiResponse::new(partners)))
}

/// PATCH /chats/:chat_id/read
pub async fn mark_chat_read(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(chat_id): IdPath,
) -> ApiResult<Json<ApiResponse<ChatResponse>>> {
    let chat = ChatService::new(state.service_context())
        .mark_read(auth.caller(), chat_id)
        .await?;
    Ok(Json(ApiResponse::new(chat)))
}

/// DELETE /chats/:chat_id
pub async fn delete_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(chat_id): IdPath,
) -> ApiResult<NoContent> {
    ChatService::new(state.service_context())
        .delete(auth.caller(), chat_id)
        .await?;
    Ok(NoContent)
}
