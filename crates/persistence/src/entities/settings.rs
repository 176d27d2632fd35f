//! Notification settings entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::NotificationSettings;
use sqlx::types::Json;
use sqlx::FromRow;

/// Database row mapping for the singleton settings table.
#[derive(Debug, Clone, FromRow)]
pub struct SettingsEntity {
    pub id: i64,
    pub threshold: f64,
    pub enabled: bool,
    pub recipients: Json<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}

impl From<SettingsEntity> for NotificationSettings {
    fn from(entity: SettingsEntity) -> Self {
        let mut settings =
            NotificationSettings::new(entity.threshold, entity.enabled, entity.recipients.0);
        settings.updated_at = Some(entity.updated_at);
        settings
    }
}
