//! Bearer token extractor for operator requests.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Role;
use shared::jwt::{extract_user_id, JwtError};

use crate::app::AppState;
use crate::error::ApiError;

/// Operator identity from a validated access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Rejects with 403 unless the operator's role is at least `required`.
    pub fn require_role(&self, required: Role) -> Result<&Self, ApiError> {
        if self.role.satisfies(required) {
            Ok(self)
        } else {
            tracing::debug!(
                user_id = self.user_id,
                role = %self.role,
                required = %required,
                "Insufficient role"
            );
            Err(ApiError::Forbidden(format!("{} role required", required)))
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = header
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim());

    match token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ApiError::Unauthorized(
            "Invalid Authorization header format".to_string(),
        )),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state.jwt.validate_token(token).map_err(|e| match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            _ => ApiError::Unauthorized("Invalid or expired token".to_string()),
        })?;

        let user_id = extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| ApiError::Unauthorized("Invalid token role".to_string()))?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role,
        })
    }
}
