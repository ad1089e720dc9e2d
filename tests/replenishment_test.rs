mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

/// Insufficient stock: ordering 15 against 10 on hand flags a 5-unit
/// shortfall and spawns one high-priority production order.
#[tokio::test]
async fn insufficient_stock_triggers_a_production_order() {
    let app = TestApp::new("replenish_insufficient").await;
    let customer_id = app.seed_customer().await;
    let work_center_id = app.seed_work_center("Assembly Line 1").await;
    let product_id = app.seed_product("SHORT-1", 10, 0, 10).await;

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
    let order_id = common::parse_id(&body["data"]["order"]["id"]);
    let order_number = body["data"]["order"]["order_number"].as_str().unwrap();

    let replenishment = body["data"]["replenishment"].as_array().unwrap();
    assert_eq!(replenishment.len(), 1);
    assert_eq!(replenishment[0]["reason"], json!("insufficient_stock"));
    assert_eq!(replenishment[0]["required_quantity"], json!(5));
    assert_eq!(replenishment[0]["status"], json!("created"));

    let production_orders = body["data"]["production_orders"].as_array().unwrap();
    assert_eq!(production_orders.len(), 1);
    let production_order = &production_orders[0];
    assert_eq!(production_order["quantity"], json!(5));
    assert_eq!(production_order["priority"], json!("high"));
    assert_eq!(production_order["status"], json!("pending"));
    assert_eq!(common::parse_id(&production_order["customer_order_id"]), order_id);
    assert!(production_order["notes"]
        .as_str()
        .unwrap()
        .contains(order_number));

    // The single default operation is bound to the first active work center.
    let operations = production_order["operations"].as_array().unwrap();
    assert_eq!(operations.len(), 1);
    assert_eq!(
        common::parse_id(&operations[0]["work_center_id"]),
        work_center_id
    );
    assert_eq!(operations[0]["status"], json!("pending"));
    assert_eq!(operations[0]["cost"], json!("0"));
}

/// Below minimum: 50 on hand minus 40 ordered leaves 10, under the minimum
/// of 20, so replenishment restores exactly the threshold.
#[tokio::test]
async fn below_minimum_stock_triggers_a_production_order() {
    let app = TestApp::new("replenish_below_minimum").await;
    let customer_id = app.seed_customer().await;
    app.seed_work_center("Assembly Line 1").await;
    let product_id = app.seed_product("MIN-1", 50, 20, 10).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_id": customer_id,
                "required_date": "2030-06-10",
                "order_lines": [
                    { "product_id": product_id, "quantity": 40, "unit_price": 10 }
                ],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let replenishment = body["data"]["replenishment"].as_array().unwrap();
    assert_eq!(replenishment.len(), 1);
    assert_eq!(replenishment[0]["reason"], json!("below_minimum"));
    assert_eq!(replenishment[0]["required_quantity"], json!(10));
    assert_eq!(
        body["data"]["production_orders"].as_array().unwrap().len(),
        1
    );
}

/// Adequate stock: 100 on hand, 10 ordered, minimum 20 — nothing flagged.
#[tokio::test]
async fn adequate_stock_creates_no_production_orders() {
    let app = TestApp::new("replenish_adequate").await;
    let customer_id = app.seed_customer().await;
    app.seed_work_center("Assembly Line 1").await;
    let product_id = app.seed_product("OK-1", 100, 20, 10).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_id": customer_id,
                "required_date": "2030-06-10",
                "order_lines": [
                    { "product_id": product_id, "quantity": 10, "unit_price": 10 }
                ],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["replenishment"].as_array().unwrap().is_empty());
    assert!(body["data"]["production_orders"]
        .as_array()
        .unwrap()
        .is_empty());
}

/// Production orders are due one calendar day before the required date.
#[tokio::test]
async fn production_order_is_due_the_day_before_the_required_date() {
    let app = TestApp::new("replenish_due_date").await;
    let customer_id = app.seed_customer().await;
    app.seed_work_center("Assembly Line 1").await;
    let product_id = app.seed_product("DUE-1", 0, 0, 10).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_id": customer_id,
                "required_date": "2030-06-10",
                "order_lines": [
                    { "product_id": product_id, "quantity": 3, "unit_price": 10 }
                ],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let production_orders = body["data"]["production_orders"].as_array().unwrap();
    assert_eq!(production_orders.len(), 1);
    assert_eq!(production_orders[0]["due_date"], json!("2030-06-09"));
}

/// With no active work center every trigger fails, but the customer order
/// itself still goes through and reports the per-product failures.
#[tokio::test]
async fn order_creation_survives_production_trigger_failures() {
    let app = TestApp::new("replenish_no_work_center").await;
    let customer_id = app.seed_customer().await;
    let product_id = app.seed_product("NOWC-1", 10, 0, 10).await;

    // The only work center is down for maintenance.
    let (status, body) = app
        .post(
            "/api/v1/work-centers",
            json!({ "name": "Assembly Line 1", "status": "maintenance" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

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
    let order_id = common::parse_id(&body["data"]["order"]["id"]);

    assert!(body["data"]["production_orders"]
        .as_array()
        .unwrap()
        .is_empty());
    let replenishment = body["data"]["replenishment"].as_array().unwrap();
    assert_eq!(replenishment.len(), 1);
    assert_eq!(replenishment[0]["status"], json!("failed"));
    assert!(replenishment[0]["error"].as_str().is_some());

    // The order committed regardless.
    let (status, body) = app.get(&format!("/api/v1/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("pending"));

    // And no production order rows exist for it.
    let (status, body) = app
        .get(&format!(
            "/api/v1/production-orders?customer_order_id={order_id}"
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(0));
}

/// Mixed order: only the flagged line spawns a production order, and the
/// listing filter finds it by originating order.
#[tokio::test]
async fn only_flagged_lines_spawn_production_orders() {
    let app = TestApp::new("replenish_mixed").await;
    let customer_id = app.seed_customer().await;
    app.seed_work_center("Assembly Line 1").await;
    let plentiful = app.seed_product("MIX-OK", 100, 0, 10).await;
    let scarce = app.seed_product("MIX-SHORT", 2, 0, 10).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_id": customer_id,
                "required_date": "2030-06-10",
                "order_lines": [
                    { "product_id": plentiful, "quantity": 5, "unit_price": 10 },
                    { "product_id": scarce, "quantity": 6, "unit_price": 10 }
                ],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order_id = common::parse_id(&body["data"]["order"]["id"]);

    let production_orders = body["data"]["production_orders"].as_array().unwrap();
    assert_eq!(production_orders.len(), 1);
    assert_eq!(common::parse_id(&production_orders[0]["product_id"]), scarce);
    assert_eq!(production_orders[0]["quantity"], json!(4));

    let (status, body) = app
        .get(&format!(
            "/api/v1/production-orders?customer_order_id={order_id}"
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(
        common::parse_id(&body["data"]["items"][0]["product_id"]),
        scarce
    );
}
