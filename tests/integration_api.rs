//! API Integration Tests
//!
//! Request-level tests over the router. Tests that only exercise input
//! validation use a lazy pool and never touch the database; the end-to-end
//! tests are `#[ignore]`d and need DATABASE_URL + migrations.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::util::ServiceExt;

use suppstore_admin::api::{self, routes::AppState};

mod common;

/// Router over a pool that connects only on first use. Good enough for
/// request paths that are rejected before any query runs.
fn lazy_app() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool");
    api::create_router().with_state(AppState::new(pool, 50))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_order_status_rejected_with_400() {
    let app = lazy_app();

    let req = Request::builder()
        .method("PATCH")
        .uri("/orders/1/status")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status": "teleported"}"#))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error_code"], "validation_error");
    assert!(json["details"].as_str().unwrap().contains("teleported"));
}

#[tokio::test]
async fn test_unknown_payment_status_rejected_with_400() {
    let app = lazy_app();

    let req = Request::builder()
        .method("PATCH")
        .uri("/orders/1/payment-status")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status": "maybe"}"#))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error_code"], "validation_error");
}

#[tokio::test]
async fn test_product_without_categories_rejected_with_400() {
    let app = lazy_app();

    // Fails structural validation before any query runs
    let req = Request::builder()
        .method("POST")
        .uri("/products")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "brand_id": 1,
                "name": "Zinc Picolinate",
                "category_ids": []
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error_code"], "validation_error");
    assert!(json["details"].as_str().unwrap().contains("category"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_order_settlement_e2e() {
    let (pool, seed) = common::setup_test_db().await;
    let app = api::create_router().with_state(AppState::new(pool, 50));

    // 1. Settle the payment
    let req = Request::builder()
        .method("POST")
        .uri(format!("/orders/{}/verify-payment", seed.order_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "settlement failed");

    let json = body_json(response).await;
    assert_eq!(json["order_status"], "processing");
    assert_eq!(json["payment_status"], "successful");

    // 2. Settling again conflicts
    let req = Request::builder()
        .method("POST")
        .uri(format!("/orders/{}/verify-payment", seed.order_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 3. Ship the order
    let req = Request::builder()
        .method("PATCH")
        .uri(format!("/orders/{}/status", seed.order_id))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status": "shipped"}"#))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 4. Cancelling a shipped order is an invalid transition
    let req = Request::builder()
        .method("POST")
        .uri(format!("/orders/{}/cancel", seed.order_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error_code"], "invalid_transition");

    // 5. Order detail reflects the shipped status
    let req = Request::builder()
        .method("GET")
        .uri(format!("/orders/{}", seed.order_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "shipped");
    assert_eq!(json["payment"]["status"], "successful");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_config_roundtrip_e2e() {
    let (pool, _seed) = common::setup_test_db().await;
    let app = api::create_router().with_state(AppState::new(pool, 50));

    // Unknown key is a 404
    let req = Request::builder()
        .method("GET")
        .uri("/configs/homepage")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // PUT then GET
    let req = Request::builder()
        .method("PUT")
        .uri("/configs/homepage")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"value": {"banner": "summer-sale"}, "updated_by": "admin-1"}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = Request::builder()
        .method("GET")
        .uri("/configs/homepage")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["value"]["banner"], "summer-sale");
    assert_eq!(json["updated_by"], "admin-1");
}
