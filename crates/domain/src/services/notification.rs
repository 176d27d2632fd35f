//! Notification gate.
//!
//! Decides, per risk evaluation, whether an alert email should be sent. The
//! decision combines the live [`NotificationSettings`] (read fresh from a
//! [`SettingsStore`] every time) with the static SMTP credentials.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::NotificationSettings;

/// Errors raised by a settings store.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings storage error: {0}")]
    Storage(String),

    #[error("Stored settings are corrupt: {0}")]
    Corrupt(String),
}

/// Source of the live notification settings.
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the current settings, creating the defaults if none exist yet.
    async fn load(&self) -> Result<NotificationSettings, SettingsError>;

    /// Replace the settings. Last writer wins.
    async fn save(
        &self,
        settings: NotificationSettings,
    ) -> Result<NotificationSettings, SettingsError>;
}

/// In-memory settings store for development and testing.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    inner: RwLock<Option<NotificationSettings>>,
    defaults: NotificationSettings,
    /// Whether to simulate storage failures.
    pub simulate_failure: bool,
}

impl InMemorySettingsStore {
    pub fn new(defaults: NotificationSettings) -> Self {
        Self {
            inner: RwLock::new(None),
            defaults,
            simulate_failure: false,
        }
    }

    /// Create a store whose every call fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<NotificationSettings, SettingsError> {
        if self.simulate_failure {
            return Err(SettingsError::Storage("Simulated failure".to_string()));
        }
        let mut guard = self.inner.write().await;
        Ok(guard.get_or_insert_with(|| self.defaults.clone()).clone())
    }

    async fn save(
        &self,
        settings: NotificationSettings,
    ) -> Result<NotificationSettings, SettingsError> {
        if self.simulate_failure {
            return Err(SettingsError::Storage("Simulated failure".to_string()));
        }
        let mut settings = settings;
        settings.recipients = settings.active_recipients();
        settings.updated_at = Some(chrono::Utc::now());
        *self.inner.write().await = Some(settings.clone());
        Ok(settings)
    }
}

/// Static SMTP transport credentials taken from configuration.
#[derive(Clone, Default)]
pub struct TransportCredentials {
    pub sender: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: u16,
}

impl fmt::Debug for TransportCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportCredentials")
            .field("sender", &self.sender)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl TransportCredentials {
    /// Names of the credential fields that are absent or blank.
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if !is_set(&self.sender) {
            missing.push("sender".to_string());
        }
        if !is_set(&self.username) {
            missing.push("smtp_username".to_string());
        }
        if !is_set(&self.password) {
            missing.push("smtp_password".to_string());
        }
        if !is_set(&self.host) {
            missing.push("smtp_host".to_string());
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Why a notification was not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Alert emails are switched off in settings.
    Disabled,
    /// Recipients or transport credentials are missing.
    Incomplete { missing: Vec<String> },
    /// The settings store could not be read.
    SettingsUnavailable,
}

impl SkipReason {
    /// Short label used as a metric tag.
    pub fn as_label(&self) -> &'static str {
        match self {
            SkipReason::Disabled => "disabled",
            SkipReason::Incomplete { .. } => "incomplete",
            SkipReason::SettingsUnavailable => "settings_unavailable",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "Email alerts are disabled in settings"),
            SkipReason::Incomplete { missing } => {
                write!(f, "Missing configuration: {}", missing.join(", "))
            }
            SkipReason::SettingsUnavailable => write!(f, "Notification settings unavailable"),
        }
    }
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Notify { recipients: Vec<String> },
    Skip(SkipReason),
}

/// Snapshot of every notification precondition, reported by the test-email
/// endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigCheck {
    pub enabled: bool,
    pub recipients: Vec<String>,
    pub sender_configured: bool,
    pub username_configured: bool,
    pub password_configured: bool,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
}

/// Gate combining live settings with transport credentials.
#[derive(Clone)]
pub struct NotificationGate {
    store: Arc<dyn SettingsStore>,
    credentials: TransportCredentials,
}

impl NotificationGate {
    pub fn new(store: Arc<dyn SettingsStore>, credentials: TransportCredentials) -> Self {
        Self { store, credentials }
    }

    /// Current enabled flag and cleaned recipient list.
    pub async fn should_notify(&self) -> Result<(bool, Vec<String>), SettingsError> {
        let settings = self.store.load().await?;
        Ok((settings.enabled, settings.active_recipients()))
    }

    /// Decide whether to notify. Never fails: a settings read error degrades
    /// to a skip.
    pub async fn evaluate(&self) -> GateDecision {
        let (enabled, recipients) = match self.should_notify().await {
            Ok(values) => values,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read notification settings");
                return GateDecision::Skip(SkipReason::SettingsUnavailable);
            }
        };

        if !enabled {
            return GateDecision::Skip(SkipReason::Disabled);
        }

        let mut missing = self.credentials.missing();
        if recipients.is_empty() {
            missing.push("recipients".to_string());
        }
        if !missing.is_empty() {
            return GateDecision::Skip(SkipReason::Incomplete { missing });
        }

        GateDecision::Notify { recipients }
    }

    /// Report which preconditions hold.
    pub async fn config_check(&self) -> Result<ConfigCheck, SettingsError> {
        let (enabled, recipients) = self.should_notify().await?;
        Ok(ConfigCheck {
            enabled,
            recipients,
            sender_configured: is_set(&self.credentials.sender),
            username_configured: is_set(&self.credentials.username),
            password_configured: is_set(&self.credentials.password),
            smtp_host: self.credentials.host.clone(),
            smtp_port: self.credentials.port,
        })
    }
}
