//! User repository.

use chrono::Utc;
use domain::models::{Role, User};
use sqlx::SqlitePool;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Repository for operator accounts.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a user. A duplicate email surfaces as a unique violation.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(email.trim())
        .bind(password_hash)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(Into::into)
    }

    /// Finds a user by email, case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result.map(|row| row.map(Into::into))
    }

    /// Finds a user by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result.map(|row| row.map(Into::into))
    }
}
