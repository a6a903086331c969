//! API integration tests
//!
//! Require a PostgreSQL instance reachable through `DATABASE_URL`; without it
//! every test prints a skip notice and passes.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_data, assert_error, assert_json, assert_status, check_test_env, fixtures::*,
    TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

async fn register(server: &TestServer, name: &str) -> AuthResponse {
    let request = RegisterRequest::unique(name);
    let response = server.post("/api/v1/auth/register", None, &request).await.unwrap();
    assert_data(response, StatusCode::CREATED).await.unwrap()
}

async fn list_item(server: &TestServer, token: &str) -> ItemResponse {
    let response = server
        .post("/api/v1/items", Some(token), &CreateItemRequest::bicycle())
        .await
        .unwrap();
    assert_data(response, StatusCode::CREATED).await.unwrap()
}

async fn item_status(server: &TestServer, item_id: &str) -> String {
    let response = server.get(&format!("/api/v1/items/{item_id}"), None).await.unwrap();
    let item: ItemResponse = assert_data(response, StatusCode::OK).await.unwrap();
    item.status
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    if !check_test_env() {
        return;
    }
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health", None).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready", None).await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], "healthy");
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_register_login_refresh() {
    if !check_test_env() {
        return;
    }
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique("ayu");

    let response = server.post("/api/v1/auth/register", None, &request).await.unwrap();
    let registered: AuthResponse = assert_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(registered.user.role, "user");

    let response = server.post("/api/v1/auth/register", None, &request).await.unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "EMAIL_ALREADY_EXISTS");

    let response = server
        .post("/api/v1/auth/login", None, &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let logged_in: AuthResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);

    let response = server
        .post(
            "/api/v1/auth/refresh",
            None,
            &json!({"refresh_token": logged_in.refresh_token}),
        )
        .await
        .unwrap();
    let refreshed: AuthResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert!(!refreshed.access_token.is_empty());
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_purchase_lifecycle() {
    if !check_test_env() {
        return;
    }
    let server = TestServer::start().await.expect("Failed to start server");
    let seller = register(&server, "seller").await;
    let buyer = register(&server, "buyer").await;
    let item = list_item(&server, &seller.access_token).await;
    assert_eq!(item.status, "available");

    let response = server
        .post(
            "/api/v1/transactions",
            Some(&seller.access_token),
            &json!({"item_id": item.id}),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "SELF_PURCHASE");

    let response = server
        .post(
            "/api/v1/transactions",
            Some(&buyer.access_token),
            &json!({"item_id": item.id}),
        )
        .await
        .unwrap();
    let transaction: TransactionResponse = assert_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(transaction.status, "pending");
    assert_eq!(transaction.seller_id, seller.user.id);
    assert_eq!(transaction.item.price, "150.00");
    assert_eq!(item_status(&server, &item.id).await, "sold");

    let path = format!("/api/v1/transactions/{}/status", transaction.id);
    let response = server
        .patch(&path, &buyer.access_token, &json!({"status": "completed"}))
        .await
        .unwrap();
    let completed: TransactionResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(completed.status, "completed");
    assert_eq!(item_status(&server, &item.id).await, "sold");

    let response = server
        .patch(&path, &seller.access_token, &json!({"status": "cancelled"}))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "TRANSACTION_TERMINAL");

    let response = server
        .get("/api/v1/transactions/purchases", Some(&buyer.access_token))
        .await
        .unwrap();
    let purchases: Paginated<TransactionResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(purchases.pagination.total_items, 1);
    assert_eq!(purchases.data[0].buyer_id, buyer.user.id);
}

#[tokio::test]
async fn test_cancel_relists_item() {
    if !check_test_env() {
        return;
    }
    let server = TestServer::start().await.expect("Failed to start server");
    let seller = register(&server, "seller").await;
    let buyer = register(&server, "buyer").await;
    let item = list_item(&server, &seller.access_token).await;

    let response = server
        .post(
            "/api/v1/transactions",
            Some(&buyer.access_token),
            &json!({"item_id": item.id}),
        )
        .await
        .unwrap();
    let transaction: TransactionResponse = assert_data(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .patch(
            &format!("/api/v1/transactions/{}/status", transaction.id),
            &seller.access_token,
            &json!({"status": "cancelled"}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    assert_eq!(item_status(&server, &item.id).await, "available");

    let response = server
        .post(
            "/api/v1/transactions",
            Some(&buyer.access_token),
            &json!({"item_id": item.id}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_purchases_have_one_winner() {
    if !check_test_env() {
        return;
    }
    let server = TestServer::start().await.expect("Failed to start server");
    let seller = register(&server, "seller").await;
    let item = list_item(&server, &seller.access_token).await;

    let mut buyers = Vec::new();
    for i in 0..8 {
        buyers.push(register(&server, &format!("buyer{i}")).await);
    }

    let body = json!({"item_id": item.id});
    let attempts = buyers
        .iter()
        .map(|buyer| server.post("/api/v1/transactions", Some(&buyer.access_token), &body));
    let responses = futures::future::join_all(attempts).await;

    let statuses: Vec<StatusCode> = responses
        .into_iter()
        .map(|r| r.expect("request failed").status())
        .collect();
    let winners = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let losers = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();

    assert_eq!(winners, 1, "{statuses:?}");
    assert_eq!(losers, buyers.len() - 1, "{statuses:?}");
    assert_eq!(item_status(&server, &item.id).await, "sold");
}

// ============================================================================
// Items and chats
// ============================================================================

#[tokio::test]
async fn test_owner_controls_listing() {
    if !check_test_env() {
        return;
    }
    let server = TestServer::start().await.expect("Failed to start server");
    let seller = register(&server, "seller").await;
    let other = register(&server, "other").await;
    let item = list_item(&server, &seller.access_token).await;
    let path = format!("/api/v1/items/{}", item.id);

    let response = server
        .patch(&path, &other.access_token, &json!({"title": "Stolen"}))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "NOT_ITEM_OWNER");

    let response = server
        .patch(&path, &seller.access_token, &json!({"price": "99.90"}))
        .await
        .unwrap();
    let updated: ItemResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated.price, "99.90");
    assert_eq!(updated.title, item.title);

    let response = server.delete(&path, &seller.access_token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get(&path, None).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_chat_about_item() {
    if !check_test_env() {
        return;
    }
    let server = TestServer::start().await.expect("Failed to start server");
    let seller = register(&server, "seller").await;
    let buyer = register(&server, "buyer").await;
    let stranger = register(&server, "stranger").await;
    let item = list_item(&server, &seller.access_token).await;

    let response = server
        .post(
            "/api/v1/chats",
            Some(&buyer.access_token),
            &json!({"receiver_id": seller.user.id, "item_id": item.id, "body": "Is it still for sale?"}),
        )
        .await
        .unwrap();
    let chat: ChatResponse = assert_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(chat.sender_id, buyer.user.id);
    assert!(!chat.is_read);

    // neither side owns the item
    let response = server
        .post(
            "/api/v1/chats",
            Some(&buyer.access_token),
            &json!({"receiver_id": stranger.user.id, "item_id": item.id, "body": "hi"}),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "CHAT_NOT_PERMITTED");

    let response = server
        .get(
            &format!(
                "/api/v1/chats/conversation?user_id={}&item_id={}",
                buyer.user.id, item.id
            ),
            Some(&seller.access_token),
        )
        .await
        .unwrap();
    let conversation: Paginated<ChatResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(conversation.pagination.limit, 20);
    assert_eq!(conversation.data.len(), 1);
    assert!(conversation.data[0].is_read);
}
