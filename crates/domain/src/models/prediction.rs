//! Order scoring input/output and the prediction log record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An order submitted for SLA-miss risk scoring.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderInput {
    #[validate(length(min = 1, max = 128, message = "order_id must be 1-128 characters"))]
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub promised_at: DateTime<Utc>,
    #[validate(custom(function = "shared::validation::validate_non_negative"))]
    pub distance_km: f64,
    #[validate(range(min = 0, max = 10000, message = "items_count must be between 0 and 10000"))]
    pub items_count: i64,
    #[validate(custom(function = "shared::validation::validate_non_negative"))]
    pub hub_load: f64,
    #[validate(custom(function = "shared::validation::validate_non_negative"))]
    pub traffic_index: f64,
    #[serde(default = "default_weather_code")]
    pub weather_code: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_carrier")]
    pub carrier: String,
}

fn default_weather_code() -> String {
    "CLEAR".to_string()
}

fn default_priority() -> String {
    "NORMAL".to_string()
}

fn default_carrier() -> String {
    "BIKE".to_string()
}

/// Response for `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub order_id: String,
    pub miss_sla_proba: f64,
    pub will_miss_sla: bool,
}

/// A row of the prediction log.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionLog {
    pub id: i64,
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
    pub miss_sla_proba: f64,
    pub will_miss_sla: bool,
    pub alert_sent: bool,
    pub distance: f64,
    pub items: i64,
    pub hub_load: f64,
    pub traffic: f64,
    pub weather: String,
    pub priority: String,
    pub carrier: String,
}

/// Query parameters for `GET /logs`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictionLogQuery {
    #[serde(default = "default_log_limit")]
    #[validate(range(min = 1, max = 500, message = "Limit must be between 1 and 500"))]
    pub limit: i64,
}

fn default_log_limit() -> i64 {
    50
}
