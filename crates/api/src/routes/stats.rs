//! Dashboard statistics handlers.

use axum::{extract::State, Json};
use chrono::Utc;
use domain::models::{OpsMetrics, TodayStats, TrendStats, TrendsQuery};
use persistence::repositories::StatsRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedQuery;

/// GET /api/v1/stats/today
pub async fn today(State(state): State<AppState>) -> Result<Json<TodayStats>, ApiError> {
    let repo = StatsRepository::new(state.pool.clone());
    Ok(Json(repo.today(Utc::now()).await?))
}

/// GET /api/v1/stats/trends?days=7
pub async fn trends(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TrendsQuery>,
) -> Result<Json<TrendStats>, ApiError> {
    let repo = StatsRepository::new(state.pool.clone());
    Ok(Json(repo.trends(query.days, Utc::now()).await?))
}

/// Alert handling KPIs.
///
/// GET /api/v1/stats/ops
pub async fn ops(State(state): State<AppState>) -> Result<Json<OpsMetrics>, ApiError> {
    let repo = StatsRepository::new(state.pool.clone());
    Ok(Json(repo.ops().await?))
}
