//! Alert entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Alert, AlertStatus, Severity};
use sqlx::FromRow;

/// Database row mapping for the alerts table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertEntity {
    pub id: i64,
    pub order_id: String,
    pub miss_sla_proba: f64,
    pub threshold: f64,
    pub triggered_at: DateTime<Utc>,
    pub status: String,
    pub severity: String,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
    pub actual_sla_missed: Option<bool>,
}

impl From<AlertEntity> for Alert {
    fn from(entity: AlertEntity) -> Self {
        // CHECK constraints keep both columns within the enum domains.
        let status = entity.status.parse().unwrap_or(AlertStatus::Open);
        let severity = entity
            .severity
            .parse()
            .unwrap_or_else(|_| Severity::from_probability(entity.miss_sla_proba));

        Self {
            id: entity.id,
            order_id: entity.order_id,
            risk_probability: entity.miss_sla_proba,
            threshold: entity.threshold,
            triggered_at: entity.triggered_at,
            status,
            severity,
            acknowledged_at: entity.acknowledged_at,
            resolved_at: entity.resolved_at,
            resolution_notes: entity.resolution_notes,
            actual_sla_missed: entity.actual_sla_missed,
        }
    }
}
