//! Purchase endpoints

use axum::{extract::State, Json};
use market_service::dto::{
    ApiResponse, CreateTransactionRequest, PaginatedResponse, TransactionResponse,
    UpdateTransactionStatusRequest,
};
use market_service::TransactionService;

use crate::extractors::{ApiJson, AuthUser, IdPath, Pagination};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> ApiResult<Created<Json<ApiResponse<TransactionResponse>>>> {
    let transaction = TransactionService::new(state.service_context())
        .create(auth.caller(), request.item_id)
        .await?;
    tracing::info!(
        transaction_id = %transaction.id,
        item_id = %request.item_id,
        buyer_id = %auth.user_id(),
        "Purchase opened"
    );
    Ok(Created(Json(ApiResponse::new(transaction))))
}

/// GET /transactions (admin)
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<TransactionResponse>>> {
    let page = TransactionService::new(state.service_context())
        .list_all(auth.caller(), page)
        .await?;
    Ok(Json(page))
}

/// GET /transactions/purchases
pub async fn list_purchases(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<TransactionResponse>>> {
    let page = TransactionService::new(state.service_context())
        .list_by_buyer(auth.caller(), page)
        .await?;
    Ok(Json(page))
}

/// GET /transactions/sales
pub async fn list_sales(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<TransactionResponse>>> {
    let page = TransactionService::new(state.service_context())
        .list_by_seller(auth.caller(), page)
        .await?;
    Ok(Json(page))
}

/// GET /transactions/:transaction_id
pub async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(transaction_id): IdPath,
) -> ApiResult<Json<ApiResponse<TransactionResponse>>> {
    let transaction = TransactionService::new(state.service_context())
        .get(auth.caller(), transaction_id)
        .await?;
    Ok(Json(ApiResponse::new(transaction)))
}

/// PATCH /transactions/:transaction_id/status
pub async fn update_transaction_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(transaction_id): IdPath,
    ApiJson(request): ApiJson<UpdateTransactionStatusRequest>,
) -> ApiResult<Json<ApiResponse<TransactionResponse>>> {
    let transaction = TransactionService::new(state.service_context())
        .update_status(auth.caller(), transaction_id, &request.status)
        .await?;
    tracing::info!(
        transaction_id = %transaction_id,
        status = %transaction.status,
        "Transaction status changed"
    );
    Ok(Json(ApiResponse::new(transaction)))
}

/// DELETE /transactions/:transaction_id
pub async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(transaction_id): IdPath,
) -> ApiResult<NoContent> {
    TransactionService::new(state.service_context())
        .delete(auth.caller(), transaction_id)
        .await?;
    Ok(NoContent)
}
