//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Per-component health, `"ok"` or `"fail"`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub api: &'static str,
    pub db: &'static str,
    pub settings: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    fn new(db_ok: bool, settings_ok: bool) -> Self {
        let status = |ok: bool| if ok { "ok" } else { "fail" };
        Self {
            api: "ok",
            db: status(db_ok),
            settings: status(settings_ok),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.db == "ok" && self.settings == "ok"
    }
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn database_ok(state: &AppState) -> bool {
    sqlx::query("SELECT 1").execute(&state.pool).await.is_ok()
}

/// Component health. Always 200 so dashboards can render partial failures.
///
/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_ok = database_ok(&state).await;
    let settings_ok = state.settings.load().await.is_ok();

    let response = HealthResponse::new(db_ok, settings_ok);
    if !response.is_healthy() {
        tracing::warn!(db = response.db, settings = response.settings, "Health check degraded");
    }

    Json(response)
}

/// Liveness probe. 200 while the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe. 503 until the database answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if database_ok(&state).await {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
