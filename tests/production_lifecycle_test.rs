mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};
use uuid::Uuid;

/// Creates an order short by 5 units and returns the production order id.
async fn seed_shortfall_production_order(app: &TestApp, sku: &str) -> (Uuid, Uuid) {
    let customer_id = app.seed_customer().await;
    app.seed_work_center("Assembly Line 1").await;
    let product_id = app.seed_product(sku, 10, 0, 10).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_id": customer_id,
                "required_date": "2030-06-10",
                "order_lines": [
                    { "product_id": product_id, "quantity": 15, "unit_price": 10 }
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let production_order_id =
        common::parse_id(&body["data"]["production_orders"][0]["id"]);
    (production_order_id, product_id)
}

async fn put_status(app: &TestApp, id: Uuid, status: &str) -> (StatusCode, Value) {
    app.put(
        &format!("/api/v1/production-orders/{id}/status"),
        json!({ "status": status }),
    )
    .await
}

#[tokio::test]
async fn completing_a_production_order_receipts_stock() {
    let app = TestApp::new("production_complete").await;
    let (production_order_id, product_id) =
        seed_shortfall_production_order(&app, "PROD-1").await;

    let (status, body) = put_status(&app, production_order_id, "in_progress").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("in_progress"));

    let (status, body) = put_status(&app, production_order_id, "completed").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("completed"));

    // 10 on hand + 5 produced. Order intake itself never writes stock.
    let (status, body) = app.get(&format!("/api/v1/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["on_hand"], json!(15));
}

#[tokio::test]
async fn production_order_cannot_skip_straight_to_completed() {
    let app = TestApp::new("production_skip").await;
    let (production_order_id, product_id) =
        seed_shortfall_production_order(&app, "PROD-2").await;

    let (status, body) = put_status(&app, production_order_id, "completed").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    // Stock untouched by the rejected transition.
    let (_, body) = app.get(&format!("/api/v1/products/{product_id}")).await;
    assert_eq!(body["data"]["on_hand"], json!(10));
}

#[tokio::test]
async fn cancelled_production_orders_are_terminal() {
    let app = TestApp::new("production_cancel").await;
    let (production_order_id, _product_id) =
        seed_shortfall_production_order(&app, "PROD-3").await;

    let (status, body) = put_status(&app, production_order_id, "cancelled").await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _body) = put_status(&app, production_order_id, "in_progress").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn production_order_lookup_includes_operations() {
    let app = TestApp::new("production_lookup").await;
    let (production_order_id, _product_id) =
        seed_shortfall_production_order(&app, "PROD-4").await;

    let (status, body) = app
        .get(&format!("/api/v1/production-orders/{production_order_id}"))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["operations"].as_array().unwrap().len(), 1);

    let (status, _body) = app
        .get(&format!("/api/v1/production-orders/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_order_status_transitions_are_validated() {
    let app = TestApp::new("order_transitions").await;
    let customer_id = app.seed_customer().await;
    let product_id = app.seed_product("TRANS-1", 100, 0, 10).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_id": customer_id,
                "required_date": "2030-06-10",
                "order_lines": [
                    { "product_id": product_id, "quantity": 1, "unit_price": 10 }
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order_id = common::parse_id(&body["data"]["order"]["id"]);

    let (status, body) = app
        .put(
            &format!("/api/v1/orders/{order_id}/status"),
            json!({ "status": "processing" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("processing"));
    assert_eq!(body["data"]["version"], json!(2));

    let (status, body) = app
        .put(
            &format!("/api/v1/orders/{order_id}/status"),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Completed is terminal.
    let (status, _body) = app
        .put(
            &format!("/api/v1/orders/{order_id}/status"),
            json!({ "status": "processing" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelling_an_order_records_the_reason() {
    let app = TestApp::new("order_cancel").await;
    let customer_id = app.seed_customer().await;
    let product_id = app.seed_product("CANCEL-1", 100, 0, 10).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_id": customer_id,
                "required_date": "2030-06-10",
                "order_lines": [
                    { "product_id": product_id, "quantity": 1, "unit_price": 10 }
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order_id = common::parse_id(&body["data"]["order"]["id"]);

    let (status, body) = app
        .post(
            &format!("/api/v1/orders/{order_id}/cancel"),
            json!({ "reason": "customer withdrew" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("cancelled"));
    assert_eq!(body["data"]["notes"], json!("customer withdrew"));
}

#[tokio::test]
async fn work_center_status_changes_affect_future_triggers() {
    let app = TestApp::new("work_center_status").await;
    let customer_id = app.seed_customer().await;
    let work_center_id = app.seed_work_center("Assembly Line 1").await;
    let product_id = app.seed_product("WC-1", 0, 0, 10).await;

    let (status, body) = app
        .put(
            &format!("/api/v1/work-centers/{work_center_id}/status"),
            json!({ "status": "inactive" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("inactive"));

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_id": customer_id,
                "required_date": "2030-06-10",
                "order_lines": [
                    { "product_id": product_id, "quantity": 1, "unit_price": 10 }
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(
        body["data"]["replenishment"][0]["status"],
        json!("failed")
    );
}
