use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bigdecimal::BigDecimal;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;
use wallet_ledger::adapters::{Fault, InMemoryWalletRepository};
use wallet_ledger::services::WalletService;
use wallet_ledger::{create_app, AppState};

fn setup_test_app() -> (Router, InMemoryWalletRepository) {
    let repo = InMemoryWalletRepository::new();
    let service = WalletService::new(Arc::new(repo.clone()), Duration::from_secs(5));
    (create_app(AppState::new(service)), repo)
}

fn dec(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

fn send(
    app: &Router,
    request: Request<Body>,
) -> impl std::future::Future<Output = (StatusCode, Value)> + Send {
    let app = app.clone();
    async move {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

fn post_operation(
    app: &Router,
    payload: Value,
) -> impl std::future::Future<Output = (StatusCode, Value)> + Send {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/wallet")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
}

async fn get_wallet(app: &Router, wallet_uuid: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .uri(format!("/api/v1/wallets/{}", wallet_uuid))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn test_deposit_flow() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("100.00"));

    let (status, body) = post_operation(
        &app,
        json!({
            "walletId": wallet.id,
            "operationType": "DEPOSIT",
            "amount": "50.00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "Transaction successful");
    assert!(body["data"].is_null());
    assert_eq!(repo.wallet(wallet.id).unwrap().balance, dec("150.00"));
    assert_eq!(repo.transactions_for(wallet.id).len(), 1);
}

#[tokio::test]
async fn test_numeric_amount_is_accepted() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("0"));

    let (status, _) = post_operation(
        &app,
        json!({
            "walletId": wallet.id,
            "operationType": "DEPOSIT",
            "amount": 100
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(repo.wallet(wallet.id).unwrap().balance, dec("100"));
}

#[tokio::test]
async fn test_numeric_amount_is_exact() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("0"));

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/wallet")
            .header("content-type", "application/json")
            .body(Body::from(format!(
                r#"{{"walletId":"{}","operationType":"DEPOSIT","amount":12345678901234567.89}}"#,
                wallet.id
            )))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        repo.wallet(wallet.id).unwrap().balance,
        dec("12345678901234567.89")
    );
    assert_eq!(
        repo.transactions_for(wallet.id)[0].amount,
        dec("12345678901234567.89")
    );
}

#[tokio::test]
async fn test_huge_exponent_amount_is_rejected() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("1"));

    for amount in ["1e9000000000000000", "1e300000000", "1e-9000000000000000"] {
        let (status, body) = post_operation(
            &app,
            json!({
                "walletId": wallet.id,
                "operationType": "DEPOSIT",
                "amount": amount
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {}", amount);
        assert_eq!(
            body["message"],
            "Invalid request data. Please check the input parameters."
        );
    }

    assert_eq!(repo.wallet(wallet.id).unwrap().balance, dec("1"));
    assert_eq!(repo.transaction_count(), 0);
}

#[tokio::test]
async fn test_insufficient_funds() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("100.00"));

    let (status, body) = post_operation(
        &app,
        json!({
            "walletId": wallet.id,
            "operationType": "WITHDRAW",
            "amount": "1000"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "insufficient funds");
    assert_eq!(repo.wallet(wallet.id).unwrap().balance, dec("100.00"));
    assert!(repo.transactions_for(wallet.id).is_empty());
}

#[tokio::test]
async fn test_operation_on_unknown_wallet() {
    let (app, repo) = setup_test_app();
    let wallet_id = Uuid::new_v4();

    let (status, body) = post_operation(
        &app,
        json!({
            "walletId": wallet_id,
            "operationType": "DEPOSIT",
            "amount": "100"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Wallet with UUID {} not found", wallet_id));
    assert_eq!(repo.transaction_count(), 0);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("100"));
    repo.inject(Fault::FailCommit);

    let (status, body) = post_operation(
        &app,
        json!({
            "walletId": wallet.id,
            "operationType": "DEPOSIT",
            "amount": "100"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");
    assert_eq!(repo.wallet(wallet.id).unwrap().balance, dec("100"));
    assert!(repo.transactions_for(wallet.id).is_empty());
}

#[tokio::test]
async fn test_negative_amount_is_invalid_data() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("100"));

    let (status, body) = post_operation(
        &app,
        json!({
            "walletId": wallet.id,
            "operationType": "DEPOSIT",
            "amount": "-100"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid request data. Please check the input parameters."
    );
}

#[tokio::test]
async fn test_unknown_operation_type_is_invalid_data() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("100"));

    let (status, body) = post_operation(
        &app,
        json!({
            "walletId": wallet.id,
            "operationType": "TRANSFER",
            "amount": "1"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid request data. Please check the input parameters."
    );
}

#[tokio::test]
async fn test_missing_amount_is_invalid_data() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("100"));

    let (status, body) = post_operation(
        &app,
        json!({
            "walletId": wallet.id,
            "operationType": "DEPOSIT"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid request data. Please check the input parameters."
    );
}

#[tokio::test]
async fn test_unreadable_field_values_are_invalid_body() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("100"));

    let payloads = [
        json!({ "walletId": "invalidUUID", "operationType": "DEPOSIT", "amount": "1" }),
        json!({ "walletId": wallet.id, "operationType": "DEPOSIT", "amount": "ten" }),
        json!({ "walletId": wallet.id, "operationType": "DEPOSIT", "amount": [1] }),
    ];

    for payload in payloads {
        let (status, body) = post_operation(&app, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request body");
    }
    assert_eq!(repo.transaction_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_invalid_body() {
    let (app, _repo) = setup_test_app();

    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/wallet")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"walletId": "123e4567-e89b-12d3-a456-426614174000", "amount": 100,"#,
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn test_get_wallet_balance() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("42.50"));

    let (status, body) = get_wallet(&app, &wallet.id.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Wallet balance successfully received");
    assert_eq!(body["data"]["uuid"], wallet.id.to_string());
    assert_eq!(
        body["data"]["balance"].as_str().unwrap().parse::<BigDecimal>().unwrap(),
        dec("42.50")
    );
}

#[tokio::test]
async fn test_get_wallet_invalid_uuid() {
    let (app, _repo) = setup_test_app();

    let (status, body) = get_wallet(&app, "invalidUUID").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid wallet UUID format.");
}

#[tokio::test]
async fn test_get_wallet_not_found() {
    let (app, repo) = setup_test_app();
    let wallet_id = Uuid::new_v4();

    let (status, body) = get_wallet(&app, &wallet_id.to_string()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Wallet with UUID {} not found", wallet_id));
    assert_eq!(repo.transaction_count(), 0);
}

#[tokio::test]
async fn test_health_check() {
    let (app, _repo) = setup_test_app();

    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["db"], "connected");
}

#[tokio::test]
async fn test_openapi_document_lists_wallet_routes() {
    let (app, _repo) = setup_test_app();

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/wallet"].is_object());
    assert!(body["paths"]["/api/v1/wallets/{wallet_uuid}"].is_object());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deposits_over_http() {
    let (app, repo) = setup_test_app();
    let wallet = repo.create_wallet(dec("0"));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let app = app.clone();
            let payload = json!({
                "walletId": wallet.id,
                "operationType": "DEPOSIT",
                "amount": "10"
            });
            tokio::spawn(async move { post_operation(&app, payload).await.0 })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(repo.wallet(wallet.id).unwrap().balance, dec("500"));
    assert_eq!(repo.transactions_for(wallet.id).len(), 50);
}
