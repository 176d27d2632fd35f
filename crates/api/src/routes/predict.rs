//! Order scoring and prediction log handlers.

use axum::{
    extract::State,
    Json,
};
use chrono::Utc;
use domain::models::{OrderInput, PredictionLog, PredictionLogQuery, PredictionOutput};
use domain::services::FeatureVector;
use persistence::repositories::PredictionRepository;
use tracing::{debug, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedQuery;
use crate::middleware::metrics;

/// Score an order and raise an alert when it is at risk.
///
/// POST /api/v1/predict
pub async fn predict(
    State(state): State<AppState>,
    Json(order): Json<OrderInput>,
) -> Result<Json<PredictionOutput>, ApiError> {
    order.validate()?;

    let features = FeatureVector::from_order(&order, Utc::now());
    let probability = state.model.predict(&features);
    let threshold = state.engine.current_threshold().await;
    let will_miss = probability >= threshold;

    debug!(
        order_id = %order.order_id,
        probability = probability,
        threshold = threshold,
        will_miss = will_miss,
        "Order scored"
    );
    metrics::record_prediction(will_miss);

    let repo = PredictionRepository::new(state.pool.clone());
    if let Err(e) = repo.log(&order, probability, will_miss, will_miss).await {
        warn!(order_id = %order.order_id, error = %e, "Failed to log prediction");
    }

    if will_miss {
        state.engine.evaluate(&order, probability, threshold).await;
    }

    Ok(Json(PredictionOutput {
        order_id: order.order_id,
        miss_sla_proba: probability,
        will_miss_sla: will_miss,
    }))
}

/// Most recent predictions, newest first.
///
/// GET /api/v1/logs?limit=50
pub async fn recent_logs(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PredictionLogQuery>,
) -> Result<Json<Vec<PredictionLog>>, ApiError> {
    let repo = PredictionRepository::new(state.pool.clone());
    let logs = repo.recent(query.limit).await?;

    Ok(Json(logs))
}
