//! Alert action entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::AlertAction;
use sqlx::types::Json;
use sqlx::FromRow;

/// Database row mapping for the alert_actions table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertActionEntity {
    pub id: i64,
    pub alert_id: i64,
    pub action_type: String,
    pub payload: Option<Json<serde_json::Value>>,
    pub created_at: DateTime<Utc>,
}

impl From<AlertActionEntity> for AlertAction {
    fn from(entity: AlertActionEntity) -> Self {
        Self {
            id: entity.id,
            alert_id: entity.alert_id,
            action_type: entity.action_type,
            payload: entity.payload.map(|Json(value)| value),
            created_at: entity.created_at,
        }
    }
}
