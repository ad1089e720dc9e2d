#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use mfgops_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

/// Helper harness spinning up the full router backed by a file-based SQLite
/// database. Each test binary passes its own database name so suites can run
/// in parallel.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new(db_name: &str) -> Self {
        let db_file = format!("mfgops_test_{db_name}.db");
        let _ = std::fs::remove_file(&db_file);

        let mut cfg = AppConfig::new(
            format!("sqlite://{db_file}?mode=rwc"),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), event_sender.clone());
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", mfgops_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    /// Seeds a customer and returns its id.
    pub async fn seed_customer(&self) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();
        let (status, body) = self
            .post(
                "/api/v1/customers",
                json!({
                    "name": "Acme Industrial",
                    "email": format!("purchasing+{suffix}@acme.test"),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed customer failed: {body}");
        parse_id(&body["data"]["id"])
    }

    /// Seeds a product and returns its id.
    pub async fn seed_product(
        &self,
        sku: &str,
        on_hand: i32,
        minimum_stock_level: i32,
        unit_price: i64,
    ) -> Uuid {
        let (status, body) = self
            .post(
                "/api/v1/products",
                json!({
                    "sku": sku,
                    "name": format!("{sku} unit"),
                    "unit_price": unit_price,
                    "on_hand": on_hand,
                    "minimum_stock_level": minimum_stock_level,
                    "lead_time_days": 7,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed product failed: {body}");
        parse_id(&body["data"]["id"])
    }

    /// Seeds an active work center and returns its id.
    pub async fn seed_work_center(&self, name: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/api/v1/work-centers",
                json!({ "name": name, "status": "active" }),
            )
            .await;
        assert_eq!(
            status,
            StatusCode::CREATED,
            "seed work center failed: {body}"
        );
        parse_id(&body["data"]["id"])
    }
}

pub fn parse_id(value: &Value) -> Uuid {
    value
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(|| panic!("expected a UUID, got {value}"))
}
