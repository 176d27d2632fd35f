//! JWT token utilities for operator sessions.
//!
//! Tokens are signed with HS256 using a shared secret from configuration and
//! carry the operator's email and role so handlers can authorize without a
//! database round-trip.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Operator email
    pub email: String,
    /// Operator role (admin, operator, viewer)
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Configuration for JWT token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Access token expiration in seconds
    pub access_token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a new JwtConfig from a shared secret.
    pub fn new(secret: &str, access_token_expiry_secs: i64) -> Result<Self, JwtError> {
        Self::with_leeway(secret, access_token_expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a new JwtConfig with custom leeway.
    pub fn with_leeway(
        secret: &str,
        access_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("JWT secret must not be empty".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Generates an access token. Returns the encoded token and its jti.
    pub fn generate_access_token(
        &self,
        user_id: i64,
        email: &str,
        role: &str,
    ) -> Result<(String, String), JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let exp = (now + Duration::seconds(self.access_token_expiry_secs)).timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp,
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, jti))
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extracts the numeric user ID from validated claims.
pub fn extract_user_id(claims: &Claims) -> Result<i64, JwtError> {
    claims.sub.parse().map_err(|_| JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> JwtConfig {
        JwtConfig::with_leeway("test_secret_key_for_jwt_testing_12345", 900, 0).unwrap()
    }

    #[test]
    fn test_generate_access_token() {
        let config = create_test_config();

        let (token, jti) = config
            .generate_access_token(7, "ops@example.com", "admin")
            .unwrap();

        assert!(!token.is_empty());
        assert!(!jti.is_empty());
        assert_eq!(token.matches('.').count(), 2);
    }

    #[test]
    fn test_validate_access_token_roundtrip_claims() {
        let config = create_test_config();

        let (token, jti) = config
            .generate_access_token(42, "lead@example.com", "operator")
            .unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "lead@example.com");
        assert_eq!(claims.role, "operator");
        assert_eq!(claims.jti, jti);
        assert_eq!(extract_user_id(&claims).unwrap(), 42);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = JwtConfig::new("", 900);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_expired_token() {
        let mut config = create_test_config();
        config.access_token_expiry_secs = -120;

        let (token, _) = config
            .generate_access_token(1, "ops@example.com", "viewer")
            .unwrap();

        let result = config.validate_token(&token);
        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let config = create_test_config();
        let other = JwtConfig::with_leeway("another_secret_entirely", 900, 0).unwrap();

        let (token, _) = other
            .generate_access_token(1, "ops@example.com", "admin")
            .unwrap();

        assert!(matches!(
            config.validate_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_malformed_token() {
        let config = create_test_config();
        assert!(config.validate_token("not_a_jwt").is_err());
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = create_test_config();

        let (_, jti1) = config.generate_access_token(1, "a@example.com", "admin").unwrap();
        let (_, jti2) = config.generate_access_token(1, "a@example.com", "admin").unwrap();

        assert_ne!(jti1, jti2);
    }

    #[test]
    fn test_extract_user_id_rejects_non_numeric_subject() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            email: "a@example.com".to_string(),
            role: "admin".to_string(),
            exp: 0,
            iat: 0,
            jti: "x".to_string(),
        };
        assert!(matches!(extract_user_id(&claims), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = create_test_config();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test_secret_key"));
    }
}
