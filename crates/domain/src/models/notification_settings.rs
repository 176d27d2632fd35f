//! Live alerting configuration edited from the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::normalize_recipients;
use validator::Validate;

/// The singleton notification settings row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Probability at or above which a prediction raises an alert.
    pub threshold: f64,
    /// Whether alert emails are dispatched at all.
    pub enabled: bool,
    /// Normalized recipient addresses.
    pub recipients: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl NotificationSettings {
    pub fn new(threshold: f64, enabled: bool, recipients: Vec<String>) -> Self {
        Self {
            threshold,
            enabled,
            recipients: normalize_recipients(recipients),
            updated_at: None,
        }
    }

    /// Recipients re-normalized, regardless of how the value was built.
    pub fn active_recipients(&self) -> Vec<String> {
        normalize_recipients(&self.recipients)
    }
}

pub const DEFAULT_THRESHOLD: f64 = 0.80;
pub const DEFAULT_RECIPIENT: &str = "ops@company.com";

impl Default for NotificationSettings {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, true, vec![DEFAULT_RECIPIENT.to_string()])
    }
}

/// Request payload for `POST /settings`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    #[validate(custom(function = "shared::validation::validate_probability"))]
    pub threshold: f64,

    pub enabled: bool,

    #[validate(
        length(max = 50, message = "At most 50 recipients are allowed"),
        custom(function = "shared::validation::validate_recipients")
    )]
    #[serde(default)]
    pub emails: Vec<String>,
}

impl From<UpdateSettingsRequest> for NotificationSettings {
    fn from(req: UpdateSettingsRequest) -> Self {
        NotificationSettings::new(req.threshold, req.enabled, req.emails)
    }
}

/// Response payload for the settings endpoints, matching the dashboard's
/// `{threshold, enabled, emails}` contract.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub threshold: f64,
    pub enabled: bool,
    pub emails: Vec<String>,
}

impl From<NotificationSettings> for SettingsResponse {
    fn from(s: NotificationSettings) -> Self {
        Self {
            threshold: s.threshold,
            enabled: s.enabled,
            emails: s.recipients,
        }
    }
}
