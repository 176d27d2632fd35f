//! Domain models for the SLA risk monitor.

pub mod alert;
pub mod alert_action;
pub mod notification_settings;
pub mod prediction;
pub mod stats;
pub mod user;

pub use alert::{
    Alert, AlertStatus, ListAlertsQuery, ResolveAlertRequest, Severity, TransitionResponse,
};
pub use alert_action::{AlertAction, CreateAlertActionRequest};
pub use notification_settings::{NotificationSettings, SettingsResponse, UpdateSettingsRequest};
pub use prediction::{OrderInput, PredictionLog, PredictionLogQuery, PredictionOutput};
pub use stats::{OpsMetrics, TodayStats, TrendStats, TrendsQuery};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, Role, User};
