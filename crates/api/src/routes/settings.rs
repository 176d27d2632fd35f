//! Notification settings handlers.

use axum::{extract::State, Json};
use domain::models::{NotificationSettings, Role, SettingsResponse, UpdateSettingsRequest};
use domain::services::{ConfigCheck, GateDecision, SkipReason};
use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Current alert configuration.
///
/// GET /api/v1/settings
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state.settings.load().await?;
    Ok(Json(settings.into()))
}

/// Replace the alert configuration. New values apply to the next evaluation.
///
/// POST /api/v1/settings (admin)
pub async fn update_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    user.require_role(Role::Admin)?;
    request.validate()?;

    let settings: NotificationSettings = request.into();
    let saved = state.settings.save(settings).await?;

    info!(
        user_id = user.user_id,
        threshold = saved.threshold,
        enabled = saved.enabled,
        recipients = saved.recipients.len(),
        "Notification settings updated"
    );

    Ok(Json(saved.into()))
}

#[derive(Debug, Serialize)]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: String,
    pub errors: Vec<String>,
    pub config_check: ConfigCheck,
}

/// Send a configuration test email to the configured recipients.
///
/// POST /api/v1/settings/test-email (admin)
pub async fn send_test_email(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<TestEmailResponse>, ApiError> {
    user.require_role(Role::Admin)?;

    let gate = state.engine.gate();
    let config_check = gate.config_check().await?;

    let recipients = match gate.evaluate().await {
        GateDecision::Notify { recipients } => recipients,
        GateDecision::Skip(reason) => {
            let errors = match &reason {
                SkipReason::Disabled => vec!["Email alerts disabled".to_string()],
                SkipReason::Incomplete { missing } => missing.clone(),
                SkipReason::SettingsUnavailable => vec![reason.to_string()],
            };
            return Ok(Json(TestEmailResponse {
                success: false,
                message: reason.to_string(),
                errors,
                config_check,
            }));
        }
    };

    let response = match state.engine.send_test(&recipients).await {
        Ok(()) => {
            info!(user_id = user.user_id, recipients = ?recipients, "Test email sent");
            TestEmailResponse {
                success: true,
                message: format!("Test email sent successfully to {}", recipients.join(", ")),
                errors: Vec::new(),
                config_check,
            }
        }
        Err(e) => {
            warn!(user_id = user.user_id, error = %e, "Test email failed");
            TestEmailResponse {
                success: false,
                message: e.to_string(),
                errors: vec![e.to_string()],
                config_check,
            }
        }
    };

    Ok(Json(response))
}
