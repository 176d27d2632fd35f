//! Operator registration and login.

use domain::models::{LoginResponse, RegisterRequest, User};
use persistence::repositories::UserRepository;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{check_policy, hash_password, verify_password, PasswordError};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::config::{AuthConfig, JwtAuthConfig};
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid signup key")]
    InvalidSignupKey,

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort(_) => AuthError::WeakPassword(err.to_string()),
            other => AuthError::PasswordError(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidSignupKey => ApiError::Forbidden(err.to_string()),
            AuthError::WeakPassword(msg) => ApiError::validation(msg),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::TokenError(e) => ApiError::Internal(e.to_string()),
            AuthError::PasswordError(e) => ApiError::Internal(e.to_string()),
            AuthError::DatabaseError(e) => e.into(),
        }
    }
}

/// Builds the token issuer from configuration.
pub fn jwt_from_config(config: &JwtAuthConfig) -> Result<JwtConfig, JwtError> {
    JwtConfig::with_leeway(
        &config.secret,
        config.access_token_expiry_secs,
        config.leeway_secs,
    )
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
    signup_key: Option<String>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, jwt: JwtConfig, auth: &AuthConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
            signup_key: auth.signup_key().map(str::to_string),
        }
    }

    /// Registers an operator account. When a signup key is configured the
    /// request must carry the same key.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        if let Some(expected) = &self.signup_key {
            if request.signup_key.as_deref() != Some(expected.as_str()) {
                return Err(AuthError::InvalidSignupKey);
            }
        }

        check_policy(&request.password)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;

        match self
            .users
            .create(&request.email, &password_hash, request.role)
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = user.id, role = %user.role, "Operator registered");
                Ok(user)
            }
            // Concurrent registration with the same email
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::EmailAlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verifies credentials and issues an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let (access_token, _jti) =
            self.jwt
                .generate_access_token(user.id, &user.email, user.role.as_str())?;

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry_secs,
            role: user.role,
            email: user.email,
        })
    }
}
