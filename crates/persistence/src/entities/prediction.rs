//! Prediction log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::PredictionLog;
use sqlx::FromRow;

/// Database row mapping for the predictions table.
#[derive(Debug, Clone, FromRow)]
pub struct PredictionEntity {
    pub id: i64,
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
    pub miss_sla_proba: f64,
    pub will_miss_sla: bool,
    pub alert_sent: bool,
    pub distance_km: f64,
    pub items_count: i64,
    pub hub_load: f64,
    pub traffic_index: f64,
    pub weather_code: String,
    pub priority: String,
    pub carrier: String,
}

impl From<PredictionEntity> for PredictionLog {
    fn from(entity: PredictionEntity) -> Self {
        Self {
            id: entity.id,
            order_id: entity.order_id,
            timestamp: entity.timestamp,
            miss_sla_proba: entity.miss_sla_proba,
            will_miss_sla: entity.will_miss_sla,
            alert_sent: entity.alert_sent,
            distance: entity.distance_km,
            items: entity.items_count,
            hub_load: entity.hub_load,
            traffic: entity.traffic_index,
            weather: entity.weather_code,
            priority: entity.priority,
            carrier: entity.carrier,
        }
    }
}
