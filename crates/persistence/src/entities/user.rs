//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Role, User};
use sqlx::FromRow;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            password_hash: entity.password_hash,
            role: entity.role.parse().unwrap_or(Role::Viewer),
            created_at: entity.created_at,
        }
    }
}
