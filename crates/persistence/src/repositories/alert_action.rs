//! Action log: append-only operator actions against alerts.

use chrono::Utc;
use domain::models::AlertAction;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::entities::AlertActionEntity;
use crate::metrics::QueryTimer;
use crate::repositories::alert::AlertStoreError;

/// Repository for alert action records.
#[derive(Clone)]
pub struct AlertActionRepository {
    pool: SqlitePool,
}

impl AlertActionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn alert_exists(
        conn: &mut sqlx::SqliteConnection,
        alert_id: i64,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM alerts WHERE id = ?)")
            .bind(alert_id)
            .fetch_one(conn)
            .await
    }

    /// Appends an action to an existing alert. Writes nothing if the alert
    /// does not exist.
    pub async fn append(
        &self,
        alert_id: i64,
        action_type: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<AlertAction, AlertStoreError> {
        let timer = QueryTimer::new("append_alert_action");
        let mut tx = self.pool.begin().await?;

        if !Self::alert_exists(&mut tx, alert_id).await? {
            return Err(AlertStoreError::NotFound(alert_id));
        }

        let entity = sqlx::query_as::<_, AlertActionEntity>(
            r#"
            INSERT INTO alert_actions (alert_id, action_type, payload, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(alert_id)
        .bind(action_type)
        .bind(payload.map(Json))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AlertStoreError::NotFound(alert_id)
            }
            _ => AlertStoreError::Database(e),
        })?;

        tx.commit().await?;
        timer.record();
        Ok(entity.into())
    }

    /// Lists actions for an alert, newest first.
    pub async fn list(&self, alert_id: i64) -> Result<Vec<AlertAction>, AlertStoreError> {
        let timer = QueryTimer::new("list_alert_actions");
        let mut conn = self.pool.acquire().await?;

        if !Self::alert_exists(&mut conn, alert_id).await? {
            return Err(AlertStoreError::NotFound(alert_id));
        }

        let rows = sqlx::query_as::<_, AlertActionEntity>(
            r#"
            SELECT * FROM alert_actions
            WHERE alert_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(alert_id)
        .fetch_all(&mut *conn)
        .await?;
        timer.record();

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
