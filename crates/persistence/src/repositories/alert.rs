//! Alert store: deduplicated insert and lifecycle transitions.

use chrono::Utc;
use domain::models::alert::MAX_ALERT_LIST_LIMIT;
use domain::models::{Alert, AlertStatus, Severity};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::entities::AlertEntity;
use crate::metrics::QueryTimer;

/// Errors raised by the alert store and action log.
#[derive(Debug, Error)]
pub enum AlertStoreError {
    #[error("Alert {0} not found")]
    NotFound(i64),

    #[error("Cannot move alert from {from} to {to}")]
    InvalidTransition { from: AlertStatus, to: AlertStatus },

    #[error("Limit must be between 1 and 200, got {0}")]
    InvalidLimit(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for alert records.
#[derive(Clone)]
pub struct AlertRepository {
    pool: SqlitePool,
}

impl AlertRepository {
    /// Creates a new AlertRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records an alert for `order_id` unless an unresolved one already exists.
    ///
    /// Returns the alert and whether it was created by this call. The partial
    /// unique index on `order_id` makes a concurrent duplicate insert a no-op,
    /// in which case the existing alert is returned with `created = false`.
    pub async fn record_if_new(
        &self,
        order_id: &str,
        risk_probability: f64,
        threshold: f64,
    ) -> Result<(Alert, bool), AlertStoreError> {
        let timer = QueryTimer::new("record_alert_if_new");
        let severity = Severity::from_probability(risk_probability);

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, AlertEntity>(
            r#"
            INSERT INTO alerts (order_id, miss_sla_proba, threshold, triggered_at, status, severity)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(risk_probability)
        .bind(threshold)
        .bind(Utc::now())
        .bind(AlertStatus::Open.as_str())
        .bind(severity.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(entity) => (entity.into(), true),
            None => {
                let existing = sqlx::query_as::<_, AlertEntity>(
                    r#"
                    SELECT * FROM alerts
                    WHERE order_id = ? AND status != ?
                    "#,
                )
                .bind(order_id)
                .bind(AlertStatus::Resolved.as_str())
                .fetch_one(&mut *tx)
                .await?;
                (existing.into(), false)
            }
        };

        tx.commit().await?;
        timer.record();
        Ok(result)
    }

    /// Finds an alert by id.
    pub async fn find_by_id(&self, alert_id: i64) -> Result<Option<Alert>, AlertStoreError> {
        let timer = QueryTimer::new("find_alert_by_id");
        let result = sqlx::query_as::<_, AlertEntity>("SELECT * FROM alerts WHERE id = ?")
            .bind(alert_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Moves an open alert to `acknowledged`.
    pub async fn acknowledge(&self, alert_id: i64) -> Result<Alert, AlertStoreError> {
        let timer = QueryTimer::new("acknowledge_alert");
        let sources = AlertStatus::sources_for(AlertStatus::Acknowledged);
        let sql = format!(
            r#"
            UPDATE alerts
            SET status = ?, acknowledged_at = ?
            WHERE id = ? AND status IN ({})
            RETURNING *
            "#,
            placeholders(sources.len())
        );
        let mut query = sqlx::query_as::<_, AlertEntity>(&sql)
            .bind(AlertStatus::Acknowledged.as_str())
            .bind(Utc::now())
            .bind(alert_id);
        for source in &sources {
            query = query.bind(source.as_str());
        }
        let result = query.fetch_optional(&self.pool).await;
        timer.record();

        match result? {
            Some(entity) => Ok(entity.into()),
            None => Err(self
                .transition_failure(alert_id, AlertStatus::Acknowledged)
                .await),
        }
    }

    /// Moves an open or acknowledged alert to `resolved`, recording the
    /// ground-truth verdict.
    pub async fn resolve(
        &self,
        alert_id: i64,
        actual_sla_missed: bool,
        resolution_notes: Option<&str>,
    ) -> Result<Alert, AlertStoreError> {
        let timer = QueryTimer::new("resolve_alert");
        let sources = AlertStatus::sources_for(AlertStatus::Resolved);
        let sql = format!(
            r#"
            UPDATE alerts
            SET status = ?,
                resolved_at = ?,
                actual_sla_missed = ?,
                resolution_notes = ?
            WHERE id = ? AND status IN ({})
            RETURNING *
            "#,
            placeholders(sources.len())
        );
        let mut query = sqlx::query_as::<_, AlertEntity>(&sql)
            .bind(AlertStatus::Resolved.as_str())
            .bind(Utc::now())
            .bind(actual_sla_missed)
            .bind(resolution_notes)
            .bind(alert_id);
        for source in &sources {
            query = query.bind(source.as_str());
        }
        let result = query.fetch_optional(&self.pool).await;
        timer.record();

        match result? {
            Some(entity) => Ok(entity.into()),
            None => Err(self.transition_failure(alert_id, AlertStatus::Resolved).await),
        }
    }

    /// Explains why a guarded update touched no row.
    async fn transition_failure(&self, alert_id: i64, to: AlertStatus) -> AlertStoreError {
        match self.find_by_id(alert_id).await {
            Ok(Some(alert)) => AlertStoreError::InvalidTransition {
                from: alert.status,
                to,
            },
            Ok(None) => AlertStoreError::NotFound(alert_id),
            Err(e) => e,
        }
    }

    /// Lists alerts, newest first, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<AlertStatus>,
        limit: i64,
    ) -> Result<Vec<Alert>, AlertStoreError> {
        if !(1..=MAX_ALERT_LIST_LIMIT).contains(&limit) {
            return Err(AlertStoreError::InvalidLimit(limit));
        }

        let timer = QueryTimer::new("list_alerts");
        let result = match status {
            Some(status) => {
                sqlx::query_as::<_, AlertEntity>(
                    r#"
                    SELECT * FROM alerts
                    WHERE status = ?
                    ORDER BY triggered_at DESC, id DESC
                    LIMIT ?
                    "#,
                )
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, AlertEntity>(
                    r#"
                    SELECT * FROM alerts
                    ORDER BY triggered_at DESC, id DESC
                    LIMIT ?
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        };
        timer.record();

        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Counts alerts for an order, resolved ones included.
    pub async fn count_for_order(&self, order_id: &str) -> Result<i64, AlertStoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM alerts WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// `?, ?, ...` for an `IN` list of `n` bound values.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
