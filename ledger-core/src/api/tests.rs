use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::api::{create_router, AppState};
use crate::session::Session;
use crate::store::InMemoryStore;
use std::sync::Arc;

fn app() -> Router {
    let session = Session::new(Arc::new(InMemoryStore::new()));
    create_router(AppState::new(session))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&app, Method::GET, "/health/store", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "connected");
}

#[tokio::test]
async fn test_purchase_and_bill_flow() {
    let app = app();

    let (status, created) = call(
        &app,
        Method::POST,
        "/sellers",
        Some(json!({
            "name": "Dairy",
            "contact": "555-0100",
            "items": [{"name": "Milk", "price": 100}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let seller_id = created["id"].as_str().unwrap().to_string();

    let (status, seller) = call(
        &app,
        Method::POST,
        "/cart/select",
        Some(json!({"sellerId": seller_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item_id = seller["items"][0]["itemId"].as_str().unwrap().to_string();

    for (date, qty) in [("2024-01-02", "3"), ("2024-01-09", "2")] {
        let (status, changed) = call(
            &app,
            Method::POST,
            "/cart/set",
            Some(json!({"itemId": item_id, "value": qty})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(changed["qty"].as_u64().unwrap().to_string(), qty);

        let (status, _) = call(&app, Method::POST, "/purchases", Some(json!({"date": date}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, bill) = call(
        &app,
        Method::POST,
        "/bills",
        Some(json!({"from": "2024-01-01", "to": "2024-01-31"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bill["grandTotal"], 500);
    assert_eq!(
        bill["sellers"][0]["items"][0]["dateWiseLines"],
        "2024-01-02: 3, 2024-01-09: 2"
    );

    let (status, text) = call(
        &app,
        Method::GET,
        "/bills/print?from=2024-01-01&to=2024-01-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.as_str().unwrap().contains("Grand total: 500"));

    let (status, report) = call(&app, Method::POST, "/bills/commit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["succeeded"].as_array().unwrap().len(), 2);

    let (status, body) = call(
        &app,
        Method::POST,
        "/bills",
        Some(json!({"from": "2024-01-01", "to": "2024-01-31"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to generate bill: no unbilled purchases"));

    let (status, months) = call(&app, Method::GET, "/reports/months?limit=3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(months, json!([{"period": "2024-01", "total": 500}]));
}

#[tokio::test]
async fn test_validation_and_not_found_errors() {
    let app = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/sellers",
        Some(json!({"name": "", "items": [{"name": "Milk", "price": 1}]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Failed to save seller: seller name must not be empty");

    let (status, _) = call(&app, Method::GET, "/sellers/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::POST, "/bills/commit", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, Method::POST, "/purchases", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_input_answers_with_json_errors() {
    let app = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/sellers",
        Some(json!({"name": "Dairy", "items": [{"name": "Milk", "price": -5}]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to read request body for POST /sellers: "));

    let (status, body) = call(
        &app,
        Method::GET,
        "/bills/print?from=2024-13-01&to=2024-01-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to read query for GET /bills/print: "));

    let (status, body) = call(&app, Method::GET, "/reports/weeks?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_seller_delete_and_oversized_cart() {
    let app = app();

    let (status, body) = call(&app, Method::DELETE, "/sellers/never-existed", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to delete seller: "));

    let (_, created) = call(
        &app,
        Method::POST,
        "/sellers",
        Some(json!({"name": "Dairy", "items": [{"name": "Milk", "price": 100}]})),
    )
    .await;
    let seller_id = created["id"].as_str().unwrap().to_string();
    let (_, seller) = call(
        &app,
        Method::POST,
        "/cart/select",
        Some(json!({"sellerId": seller_id})),
    )
    .await;
    let item_id = seller["items"][0]["itemId"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        Method::POST,
        "/cart/change",
        Some(json!({"itemId": item_id, "delta": i64::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::POST, "/purchases", Some(json!({"date": "2024-01-02"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Failed to save purchase: amount too large");

    let (_, purchases) = call(&app, Method::GET, "/purchases", None).await;
    assert_eq!(purchases, json!([]));
}
