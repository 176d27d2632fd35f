//! Operator authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::{LoginRequest, LoginResponse, RegisterRequest, Role};
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// Register an operator account.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    request.validate()?;

    let user = state.auth.register(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            ok: true,
            id: user.id,
            email: user.email,
            role: user.role,
        }),
    ))
}

/// Exchange credentials for an access token.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let response = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(response))
}
