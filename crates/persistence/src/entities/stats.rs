//! Aggregate row mappings for the statistics queries.

use sqlx::FromRow;

/// Risk band counts over a set of predictions.
#[derive(Debug, Clone, Default, FromRow)]
pub struct RiskCountsRow {
    pub total: i64,
    pub high: i64,
    pub medium: i64,
}

/// Prediction counts grouped by hour or day.
#[derive(Debug, Clone, FromRow)]
pub struct BucketRow {
    pub bucket: String,
    pub total: i64,
    pub risky: i64,
    pub avg_risk: Option<f64>,
}

/// Per-carrier delay counts.
#[derive(Debug, Clone, FromRow)]
pub struct CarrierRow {
    pub carrier: String,
    pub total: i64,
    pub delayed: i64,
}

/// Alert handling counts.
#[derive(Debug, Clone, FromRow)]
pub struct OpsRow {
    pub total_alerts: i64,
    pub resolved: i64,
    pub false_positives: i64,
    pub avg_response_secs: Option<f64>,
}
