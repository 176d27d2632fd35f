//! Aggregate statistics over predictions and alerts.

use chrono::{DateTime, Duration, Utc};
use domain::models::stats::{
    percent, risk_color, CarrierPerformance, DailyTrend, HourlyBucket, HourlyRisk, RiskSlice,
};
use domain::models::{OpsMetrics, TodayStats, TrendStats};
use sqlx::SqlitePool;

use crate::entities::{BucketRow, CarrierRow, OpsRow, RiskCountsRow};
use crate::metrics::QueryTimer;

const RISK_BANDS: [&str; 3] = ["High Risk", "Medium Risk", "Low Risk"];

/// Read-only repository for dashboard statistics.
///
/// Timestamps are stored as RFC 3339 UTC text, so calendar days and hours are
/// taken with `substr` and time windows compare as strings.
#[derive(Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All-time risk band counts plus today's hourly breakdown.
    pub async fn today(&self, now: DateTime<Utc>) -> Result<TodayStats, sqlx::Error> {
        let timer = QueryTimer::new("stats_today");
        let date = now.format("%Y-%m-%d").to_string();

        let counts = sqlx::query_as::<_, RiskCountsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN will_miss_sla THEN 1 ELSE 0 END), 0) AS high,
                COALESCE(SUM(CASE WHEN NOT will_miss_sla
                                   AND miss_sla_proba > 0.5
                                   AND miss_sla_proba < 0.8 THEN 1 ELSE 0 END), 0) AS medium
            FROM predictions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let hourly = sqlx::query_as::<_, BucketRow>(
            r#"
            SELECT
                substr(timestamp, 12, 2) AS bucket,
                COUNT(*) AS total,
                COALESCE(SUM(will_miss_sla), 0) AS risky,
                AVG(miss_sla_proba) AS avg_risk
            FROM predictions
            WHERE substr(timestamp, 1, 10) = ?
            GROUP BY bucket
            ORDER BY bucket
            "#,
        )
        .bind(&date)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(TodayStats {
            date,
            total_predictions: counts.total,
            high_risk: counts.high,
            medium_risk: counts.medium,
            low_risk: (counts.total - counts.high - counts.medium).max(0),
            risk_percent: percent(counts.high, counts.total, 2),
            hourly: hourly
                .into_iter()
                .map(|row| HourlyBucket {
                    hour: row.bucket,
                    total: row.total,
                    risky: row.risky,
                })
                .collect(),
        })
    }

    /// Trend view over the last `days` days.
    pub async fn trends(&self, days: i64, now: DateTime<Utc>) -> Result<TrendStats, sqlx::Error> {
        let timer = QueryTimer::new("stats_trends");
        let since_day = (now - Duration::days(days)).format("%Y-%m-%d").to_string();

        let daily = sqlx::query_as::<_, BucketRow>(
            r#"
            SELECT
                substr(timestamp, 1, 10) AS bucket,
                COUNT(*) AS total,
                COALESCE(SUM(will_miss_sla), 0) AS risky,
                ROUND(AVG(miss_sla_proba), 3) AS avg_risk
            FROM predictions
            GROUP BY bucket
            ORDER BY bucket DESC
            LIMIT ?
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await?;

        let last_day = sqlx::query_as::<_, BucketRow>(
            r#"
            SELECT
                substr(timestamp, 12, 2) AS bucket,
                COUNT(*) AS total,
                COUNT(*) AS risky,
                NULL AS avg_risk
            FROM predictions
            WHERE timestamp >= ? AND will_miss_sla = 1
            GROUP BY bucket
            "#,
        )
        .bind(now - Duration::hours(24))
        .fetch_all(&self.pool)
        .await?;

        let bands = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT
                CASE
                    WHEN miss_sla_proba >= 0.8 THEN 'High Risk'
                    WHEN miss_sla_proba > 0.5 THEN 'Medium Risk'
                    ELSE 'Low Risk'
                END AS name,
                COUNT(*) AS value
            FROM predictions
            WHERE substr(timestamp, 1, 10) >= ?
            GROUP BY name
            "#,
        )
        .bind(&since_day)
        .fetch_all(&self.pool)
        .await?;

        let carriers = sqlx::query_as::<_, CarrierRow>(
            r#"
            SELECT
                carrier,
                COUNT(*) AS total,
                COALESCE(SUM(will_miss_sla), 0) AS delayed
            FROM predictions
            WHERE substr(timestamp, 1, 10) >= ?
            GROUP BY carrier
            ORDER BY carrier
            "#,
        )
        .bind(&since_day)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        let hourly = (0..24)
            .map(|hour| {
                let slot = format!("{:02}", hour);
                let risk = last_day
                    .iter()
                    .find(|row| row.bucket == slot)
                    .map_or(0, |row| row.risky);
                HourlyRisk {
                    time: format!("{}:00", slot),
                    risk,
                }
            })
            .collect();

        let risk_distribution = RISK_BANDS
            .iter()
            .filter_map(|band| {
                bands.iter().find(|(name, _)| name == band).map(|(name, value)| RiskSlice {
                    name: name.clone(),
                    value: *value,
                    color: risk_color(name).to_string(),
                })
            })
            .collect();

        let carrier_performance = carriers
            .into_iter()
            .map(|row| CarrierPerformance {
                name: row.carrier,
                on_time: percent(row.total - row.delayed, row.total, 1),
                delayed: percent(row.delayed, row.total, 1),
            })
            .collect();

        Ok(TrendStats {
            hourly,
            risk_distribution,
            carrier_performance,
            daily: daily
                .into_iter()
                .map(|row| DailyTrend {
                    day: row.bucket,
                    total: row.total,
                    risky: row.risky,
                    avg_risk: row.avg_risk.unwrap_or(0.0),
                })
                .collect(),
        })
    }

    /// Alert handling KPIs.
    pub async fn ops(&self) -> Result<OpsMetrics, sqlx::Error> {
        let timer = QueryTimer::new("stats_ops");
        let row = sqlx::query_as::<_, OpsRow>(
            r#"
            SELECT
                COUNT(*) AS total_alerts,
                COALESCE(SUM(CASE WHEN status = 'resolved' THEN 1 ELSE 0 END), 0) AS resolved,
                COALESCE(SUM(CASE WHEN status = 'resolved' AND actual_sla_missed = 0
                                  THEN 1 ELSE 0 END), 0) AS false_positives,
                AVG(CASE WHEN resolved_at IS NOT NULL
                         THEN (julianday(resolved_at) - julianday(triggered_at)) * 86400.0
                    END) AS avg_response_secs
            FROM alerts
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        let row = row?;

        Ok(OpsMetrics::from_counts(
            row.total_alerts,
            row.resolved,
            row.false_positives,
            row.avg_response_secs,
        ))
    }
}
