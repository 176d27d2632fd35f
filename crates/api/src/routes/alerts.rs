//! Alert lifecycle and action log handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    Alert, AlertAction, CreateAlertActionRequest, ListAlertsQuery, ResolveAlertRequest,
    TransitionResponse,
};
use persistence::repositories::{AlertActionRepository, AlertRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedQuery;

/// List recent alerts, newest first.
///
/// GET /api/v1/alerts?limit=50&status=open
pub async fn list_alerts(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListAlertsQuery>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let repo = AlertRepository::new(state.pool.clone());
    let alerts = repo.list(query.status, query.limit).await?;

    Ok(Json(alerts))
}

/// Acknowledge an open alert.
///
/// POST /api/v1/alerts/:alert_id/ack
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<i64>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let repo = AlertRepository::new(state.pool.clone());
    let alert = repo.acknowledge(alert_id).await?;

    info!(alert_id = alert.id, order_id = %alert.order_id, "Alert acknowledged");

    Ok(Json(TransitionResponse { ok: true, alert }))
}

/// Resolve an open or acknowledged alert with a ground-truth verdict.
///
/// POST /api/v1/alerts/:alert_id/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<i64>,
    Json(request): Json<ResolveAlertRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    request.validate()?;

    let notes = request
        .resolution_notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let repo = AlertRepository::new(state.pool.clone());
    let alert = repo
        .resolve(alert_id, request.actual_sla_missed, notes)
        .await?;

    info!(
        alert_id = alert.id,
        order_id = %alert.order_id,
        actual_sla_missed = request.actual_sla_missed,
        "Alert resolved"
    );

    Ok(Json(TransitionResponse { ok: true, alert }))
}

/// Action history for an alert, newest first.
///
/// GET /api/v1/alerts/:alert_id/actions
pub async fn list_actions(
    State(state): State<AppState>,
    Path(alert_id): Path<i64>,
) -> Result<Json<Vec<AlertAction>>, ApiError> {
    let repo = AlertActionRepository::new(state.pool.clone());
    let actions = repo.list(alert_id).await?;
    Ok(Json(actions))
}

/// Record an operator action (e.g. REROUTE, ESCALATE) against an alert.
///
/// POST /api/v1/alerts/:alert_id/actions
pub async fn create_action(
    State(state): State<AppState>,
    Path(alert_id): Path<i64>,
    Json(request): Json<CreateAlertActionRequest>,
) -> Result<(StatusCode, Json<AlertAction>), ApiError> {
    request.validate()?;

    let action_type = request.action_type.trim();
    if action_type.is_empty() {
        return Err(ApiError::validation("Action type must not be blank"));
    }

    let repo = AlertActionRepository::new(state.pool.clone());
    let action = repo
        .append(
            alert_id,
            action_type,
            request.payload.map(serde_json::Value::Object),
        )
        .await?;

    info!(
        alert_id = alert_id,
        action_id = action.id,
        action_type = %action.action_type,
        "Alert action recorded"
    );

    Ok((StatusCode::CREATED, Json(action)))
}
