//! Common test utilities for integration tests.
//!
//! Every test gets its own in-memory SQLite database, so tests can run in
//! parallel without cleanup.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use domain::services::dispatcher::RecordedDelivery;
use domain::services::{FixedRiskModel, MockDispatcher};
use fake::{faker::internet::en::SafeEmail, Fake};
use serde_json::{json, Value};
use sla_monitor_api::app::{create_app, AppState};
use sla_monitor_api::config::{
    AlertsConfig, AuthConfig, Config, DatabaseConfig, EmailConfig, JwtAuthConfig, LoggingConfig,
    ModelConfig, SecurityConfig, ServerConfig,
};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "Sup3rSecret!";

/// Create a test configuration with complete SMTP credentials and no
/// delivery throttle.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 60,
            busy_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig::default(),
        jwt: JwtAuthConfig {
            secret: "integration-test-secret-with-enough-entropy".to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 30,
        },
        auth: AuthConfig::default(),
        email: EmailConfig {
            provider: "console".to_string(),
            smtp_host: "smtp.test.local".to_string(),
            smtp_port: 587,
            smtp_username: "alerts@test.local".to_string(),
            smtp_password: "app-password".to_string(),
            sender_email: "alerts@test.local".to_string(),
            sender_name: "SLA Monitor".to_string(),
            timeout_secs: 5,
            throttle_ms: 0,
        },
        model: ModelConfig::default(),
        alerts: AlertsConfig {
            default_threshold: 0.80,
            default_enabled: true,
            default_recipients: vec!["ops@company.com".to_string()],
        },
    }
}

/// Create a migrated in-memory database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = persistence::db::create_memory_pool()
        .await
        .expect("Failed to create in-memory database");
    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A router wired to a fixed-probability model and a recording dispatcher.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub dispatcher: Arc<MockDispatcher>,
}

impl TestApp {
    /// Build an app whose model always returns `probability`.
    pub async fn new(probability: f64) -> Self {
        Self::with_config(test_config(), probability).await
    }

    pub async fn with_config(config: Config, probability: f64) -> Self {
        let pool = create_test_pool().await;
        let dispatcher = Arc::new(MockDispatcher::new());
        let state = AppState::new(
            config,
            pool.clone(),
            Arc::new(FixedRiskModel(probability)),
            dispatcher.clone(),
        )
        .expect("Failed to build app state");

        Self {
            router: create_app(state),
            pool,
            dispatcher,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self.request(empty_request(Method::GET, uri, None)).await;
        into_json(response).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self.request(json_request(Method::POST, uri, body, None)).await;
        into_json(response).await
    }

    pub async fn post_as(&self, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
        let response = self
            .request(json_request(Method::POST, uri, body, Some(token)))
            .await;
        into_json(response).await
    }

    /// Register an operator with `role` and return an access token.
    pub async fn token_for(&self, role: &str) -> String {
        let email: String = SafeEmail().fake();
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                json!({ "email": email, "password": TEST_PASSWORD, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["access_token"]
            .as_str()
            .expect("Missing access_token")
            .to_string()
    }

    /// Score one order through the HTTP API.
    pub async fn predict(&self, order_id: &str) -> (StatusCode, Value) {
        self.post("/api/v1/predict", order_payload(order_id)).await
    }

    /// Wait for spawned deliveries to land in the mock dispatcher.
    pub async fn wait_for_deliveries(&self, expected: usize) -> Vec<RecordedDelivery> {
        for _ in 0..50 {
            let deliveries = self.dispatcher.deliveries().await;
            if deliveries.len() >= expected {
                return deliveries;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.dispatcher.deliveries().await
    }
}

/// A valid order payload.
pub fn order_payload(order_id: &str) -> Value {
    let created = Utc::now() - ChronoDuration::minutes(20);
    let promised = created + ChronoDuration::minutes(45);
    json!({
        "order_id": order_id,
        "created_at": created.to_rfc3339(),
        "promised_at": promised.to_rfc3339(),
        "distance_km": 12.5,
        "items_count": 4,
        "hub_load": 0.92,
        "traffic_index": 0.8,
        "weather_code": "RAIN",
        "priority": "EXPRESS",
        "carrier": "VAN"
    })
}

pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

/// Split a response into its status and JSON body (`Null` when not JSON).
pub async fn into_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}
