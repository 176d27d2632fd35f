use std::sync::Arc;

use anyhow::{Context, Result};
use domain::services::{LogisticRiskModel, RiskModel};
use tracing::info;

use sla_monitor_api::{app, config, middleware, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting SLA Monitor API v{}", env!("CARGO_PKG_VERSION"));

    let weights_path = &config.model.weights_path;
    let model: Arc<dyn RiskModel> = Arc::new(
        LogisticRiskModel::from_file(weights_path)
            .with_context(|| format!("Failed to load risk model from {}", weights_path))?,
    );
    info!(path = %weights_path, "Risk model loaded");

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let dispatcher = services::dispatcher_from_config(&config.email);
    info!(provider = %config.email.provider, "Alert dispatcher configured");

    let addr = config.socket_addr()?;
    let state = app::AppState::new(config, pool, model, dispatcher)?;
    let app = app::create_app(state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
