use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{AlertDispatcher, NotificationGate, RiskModel, SettingsStore};
use persistence::repositories::{AlertRepository, SettingsRepository};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{alerts, auth, health, predict, settings, stats};
use crate::services::{auth::jwt_from_config, AlertEngine, AuthService};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub settings: Arc<dyn SettingsStore>,
    pub engine: Arc<AlertEngine>,
    pub model: Arc<dyn RiskModel>,
    pub auth: Arc<AuthService>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    /// Wires repositories, the notification gate and the alert engine.
    pub fn new(
        config: Config,
        pool: SqlitePool,
        model: Arc<dyn RiskModel>,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Result<Self, JwtError> {
        let config = Arc::new(config);
        let jwt = jwt_from_config(&config.jwt)?;

        let settings: Arc<dyn SettingsStore> = Arc::new(SettingsRepository::new(
            pool.clone(),
            config.alerts.default_settings(),
        ));

        let gate = NotificationGate::new(
            Arc::clone(&settings),
            config.email.transport_credentials(),
        );

        let engine = AlertEngine::new(
            AlertRepository::new(pool.clone()),
            Arc::clone(&settings),
            gate,
            dispatcher,
            config.email.delivery_policy(),
            config.alerts.default_threshold,
        );

        let auth = AuthService::new(pool.clone(), jwt.clone(), &config.auth);

        Ok(Self {
            pool,
            config,
            settings,
            engine: Arc::new(engine),
            model,
            auth: Arc::new(auth),
            jwt: Arc::new(jwt),
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api_routes = Router::new()
        // Scoring
        .route("/api/v1/predict", post(predict::predict))
        .route("/api/v1/logs", get(predict::recent_logs))
        // Settings (mutations are admin only)
        .route(
            "/api/v1/settings",
            get(settings::get_settings).post(settings::update_settings),
        )
        .route("/api/v1/settings/test-email", post(settings::send_test_email))
        // Alerts
        .route("/api/v1/alerts", get(alerts::list_alerts))
        .route("/api/v1/alerts/:alert_id/ack", post(alerts::acknowledge_alert))
        .route("/api/v1/alerts/:alert_id/resolve", post(alerts::resolve_alert))
        .route(
            "/api/v1/alerts/:alert_id/actions",
            get(alerts::list_actions).post(alerts::create_action),
        )
        // Stats
        .route("/api/v1/stats/today", get(stats::today))
        .route("/api/v1/stats/trends", get(stats::trends))
        .route("/api/v1/stats/ops", get(stats::ops))
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_both_modes() {
        let _any = cors_layer(&[]);
        let _listed = cors_layer(&[
            "https://dashboard.company.com".to_string(),
            "not a header value\n".to_string(),
        ]);
    }
}
