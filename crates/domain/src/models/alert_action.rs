//! Operator action log entries attached to an alert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An append-only record of something an operator did about an alert
/// (escalate, reroute, call customer, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertAction {
    pub id: i64,
    pub alert_id: i64,
    pub action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for appending an action.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAlertActionRequest {
    #[validate(length(min = 1, max = 64, message = "Action type must be 1-64 characters"))]
    pub action_type: String,

    pub payload: Option<serde_json::Map<String, serde_json::Value>>,
}
