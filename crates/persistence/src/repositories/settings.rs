//! Settings store backed by the singleton `settings` row.

use chrono::Utc;
use domain::models::NotificationSettings;
use domain::services::{SettingsError, SettingsStore};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::entities::SettingsEntity;
use crate::metrics::QueryTimer;

/// Repository for the notification settings row.
///
/// The row is created from `defaults` on first access.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    defaults: NotificationSettings,
}

fn storage_error(e: sqlx::Error) -> SettingsError {
    SettingsError::Storage(e.to_string())
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool, defaults: NotificationSettings) -> Self {
        Self { pool, defaults }
    }

    async fn find(&self) -> Result<Option<SettingsEntity>, sqlx::Error> {
        sqlx::query_as::<_, SettingsEntity>("SELECT * FROM settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
    }

    async fn insert_defaults(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (id, threshold, enabled, recipients, updated_at)
            VALUES (1, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(self.defaults.threshold)
        .bind(self.defaults.enabled)
        .bind(Json(self.defaults.active_recipients()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SettingsStore for SettingsRepository {
    async fn load(&self) -> Result<NotificationSettings, SettingsError> {
        let timer = QueryTimer::new("load_settings");

        let entity = match self.find().await.map_err(storage_error)? {
            Some(entity) => entity,
            None => {
                tracing::info!("Initializing notification settings with defaults");
                self.insert_defaults().await.map_err(storage_error)?;
                self.find().await.map_err(storage_error)?.ok_or_else(|| {
                    SettingsError::Corrupt("settings row missing after initialization".into())
                })?
            }
        };

        timer.record();
        Ok(entity.into())
    }

    async fn save(
        &self,
        settings: NotificationSettings,
    ) -> Result<NotificationSettings, SettingsError> {
        let timer = QueryTimer::new("save_settings");
        let entity = sqlx::query_as::<_, SettingsEntity>(
            r#"
            INSERT INTO settings (id, threshold, enabled, recipients, updated_at)
            VALUES (1, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                threshold = excluded.threshold,
                enabled = excluded.enabled,
                recipients = excluded.recipients,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(settings.threshold)
        .bind(settings.enabled)
        .bind(Json(settings.active_recipients()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;
        timer.record();

        tracing::info!(
            threshold = entity.threshold,
            enabled = entity.enabled,
            recipients = entity.recipients.0.len(),
            "Notification settings updated"
        );
        Ok(entity.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, run_migrations};

    async fn repo() -> SettingsRepository {
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        SettingsRepository::new(pool, NotificationSettings::default())
    }

    #[tokio::test]
    async fn test_defaults_created_on_first_load() {
        let repo = repo().await;
        let settings = repo.load().await.unwrap();
        assert_eq!(settings.threshold, 0.8);
        assert!(settings.enabled);
        assert_eq!(settings.recipients, vec!["ops@company.com"]);
        assert!(settings.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_save_normalizes_and_persists() {
        let repo = repo().await;
        let mut update = NotificationSettings::new(0.65, false, vec![]);
        update.recipients = vec![
            " a@company.com".to_string(),
            "".to_string(),
            "A@company.com".to_string(),
            "b@company.com ".to_string(),
        ];

        let saved = repo.save(update).await.unwrap();
        assert_eq!(saved.recipients, vec!["a@company.com", "b@company.com"]);

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.threshold, 0.65);
        assert!(!loaded.enabled);
        assert_eq!(loaded.recipients, saved.recipients);
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let repo = repo().await;
        repo.save(NotificationSettings::new(0.5, true, vec!["x@a.io".into()]))
            .await
            .unwrap();
        repo.save(NotificationSettings::new(0.9, true, vec!["y@a.io".into()]))
            .await
            .unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.threshold, 0.9);
        assert_eq!(loaded.recipients, vec!["y@a.io"]);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
