//! Prediction log repository.

use chrono::{DateTime, Utc};
use domain::models::{OrderInput, PredictionLog};
use sqlx::SqlitePool;

use crate::entities::PredictionEntity;
use crate::metrics::QueryTimer;

/// Repository for the append-only prediction log.
#[derive(Clone)]
pub struct PredictionRepository {
    pool: SqlitePool,
}

impl PredictionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends a scored order, stamped with the current time.
    pub async fn log(
        &self,
        order: &OrderInput,
        miss_sla_proba: f64,
        will_miss_sla: bool,
        alert_sent: bool,
    ) -> Result<i64, sqlx::Error> {
        self.log_at(order, miss_sla_proba, will_miss_sla, alert_sent, Utc::now())
            .await
    }

    /// Appends a scored order with an explicit timestamp.
    pub async fn log_at(
        &self,
        order: &OrderInput,
        miss_sla_proba: f64,
        will_miss_sla: bool,
        alert_sent: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("log_prediction");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO predictions (
                order_id, timestamp, miss_sla_proba, will_miss_sla, alert_sent,
                distance_km, items_count, hub_load, traffic_index,
                weather_code, priority, carrier
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&order.order_id)
        .bind(timestamp)
        .bind(miss_sla_proba)
        .bind(will_miss_sla)
        .bind(alert_sent)
        .bind(order.distance_km)
        .bind(order.items_count)
        .bind(order.hub_load)
        .bind(order.traffic_index)
        .bind(&order.weather_code)
        .bind(&order.priority)
        .bind(&order.carrier)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recent predictions, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<PredictionLog>, sqlx::Error> {
        let timer = QueryTimer::new("recent_predictions");
        let rows = sqlx::query_as::<_, PredictionEntity>(
            r#"
            SELECT * FROM predictions
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(rows?.into_iter().map(Into::into).collect())
    }
}
