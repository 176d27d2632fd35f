//! SLA risk alert domain model and lifecycle rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Probability at or above which an alert is `high` severity.
pub const HIGH_SEVERITY_FLOOR: f64 = 0.8;

/// Probability strictly above which an alert is at least `medium` severity.
pub const MEDIUM_SEVERITY_FLOOR: f64 = 0.5;

/// Largest page an alert listing may request.
pub const MAX_ALERT_LIST_LIMIT: i64 = 200;

/// Lifecycle state of an alert.
///
/// Transitions only move forward: `open → acknowledged → resolved`, or
/// `open → resolved` directly. `resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 3] = [
        AlertStatus::Open,
        AlertStatus::Acknowledged,
        AlertStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Open => "open",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: AlertStatus) -> bool {
        matches!(
            (self, next),
            (AlertStatus::Open, AlertStatus::Acknowledged)
                | (AlertStatus::Open, AlertStatus::Resolved)
                | (AlertStatus::Acknowledged, AlertStatus::Resolved)
        )
    }

    /// States from which the state machine allows moving to `next`.
    pub fn sources_for(next: AlertStatus) -> Vec<AlertStatus> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(next))
            .collect()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Resolved)
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(AlertStatus::Open),
            "acknowledged" => Ok(AlertStatus::Acknowledged),
            "resolved" => Ok(AlertStatus::Resolved),
            other => Err(format!("Unknown alert status: {}", other)),
        }
    }
}

/// Coarse risk bucket, derived once from the triggering probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Buckets a probability: high `>= 0.8`, medium `(0.5, 0.8)`, low `<= 0.5`.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_SEVERITY_FLOOR {
            Severity::High
        } else if probability > MEDIUM_SEVERITY_FLOOR {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// A persisted SLA-miss risk alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub order_id: String,
    /// Probability captured at trigger time.
    #[serde(rename = "miss_sla_proba")]
    pub risk_probability: f64,
    /// Threshold in force when the alert fired (audit value).
    pub threshold: f64,
    pub triggered_at: DateTime<Utc>,
    pub status: AlertStatus,
    pub severity: Severity,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
    pub actual_sla_missed: Option<bool>,
}

/// Request payload for resolving an alert.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResolveAlertRequest {
    /// Ground-truth verdict: did the order actually miss its SLA?
    pub actual_sla_missed: bool,

    #[validate(length(max = 2000, message = "Resolution notes must be at most 2000 characters"))]
    pub resolution_notes: Option<String>,
}

/// Query parameters for listing alerts.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListAlertsQuery {
    #[serde(default = "default_list_limit")]
    #[validate(range(min = 1, max = 200, message = "Limit must be between 1 and 200"))]
    pub limit: i64,

    /// Filter by status: open, acknowledged, resolved
    pub status: Option<AlertStatus>,
}

fn default_list_limit() -> i64 {
    50
}

/// Acknowledgement for a successful lifecycle transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionResponse {
    pub ok: bool,
    pub alert: Alert,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alert(status: AlertStatus) -> Alert {
        Alert {
            id: 1,
            order_id: "O1".to_string(),
            risk_probability: 0.92,
            threshold: 0.8,
            triggered_at: Utc::now(),
            status,
            severity: Severity::High,
            acknowledged_at: None,
            resolved_at: None,
            resolution_notes: None,
            actual_sla_missed: None,
        }
    }

    #[test]
    fn test_severity_bands() {
        assert_eq!(Severity::from_probability(0.95), Severity::High);
        assert_eq!(Severity::from_probability(0.65), Severity::Medium);
        assert_eq!(Severity::from_probability(0.5), Severity::Low);
        assert_eq!(Severity::from_probability(0.1), Severity::Low);
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(Severity::from_probability(0.8), Severity::High);
        assert_eq!(Severity::from_probability(0.7999), Severity::Medium);
        assert_eq!(Severity::from_probability(0.5001), Severity::Medium);
        assert_eq!(Severity::from_probability(0.0), Severity::Low);
        assert_eq!(Severity::from_probability(1.0), Severity::High);
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(AlertStatus::Open.can_transition_to(AlertStatus::Acknowledged));
        assert!(AlertStatus::Open.can_transition_to(AlertStatus::Resolved));
        assert!(AlertStatus::Acknowledged.can_transition_to(AlertStatus::Resolved));
    }

    #[test]
    fn test_backward_and_noop_transitions_rejected() {
        assert!(!AlertStatus::Acknowledged.can_transition_to(AlertStatus::Acknowledged));
        assert!(!AlertStatus::Acknowledged.can_transition_to(AlertStatus::Open));
        assert!(!AlertStatus::Open.can_transition_to(AlertStatus::Open));
        for next in [
            AlertStatus::Open,
            AlertStatus::Acknowledged,
            AlertStatus::Resolved,
        ] {
            assert!(!AlertStatus::Resolved.can_transition_to(next));
        }
    }

    #[test]
    fn test_resolved_is_only_terminal_state() {
        assert!(AlertStatus::Resolved.is_terminal());
        assert!(!AlertStatus::Open.is_terminal());
        assert!(!AlertStatus::Acknowledged.is_terminal());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("open".parse::<AlertStatus>().unwrap(), AlertStatus::Open);
        assert_eq!(
            " Acknowledged ".parse::<AlertStatus>().unwrap(),
            AlertStatus::Acknowledged
        );
        assert_eq!("RESOLVED".parse::<AlertStatus>().unwrap(), AlertStatus::Resolved);
        assert!("closed".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn test_severity_display_roundtrip() {
        for severity in [Severity::Low, Severity::Medium, Severity::High] {
            assert_eq!(severity.to_string().parse::<Severity>().unwrap(), severity);
        }
    }

    #[test]
    fn test_alert_serialization_shape() {
        let json = serde_json::to_value(sample_alert(AlertStatus::Open)).unwrap();
        assert_eq!(json["order_id"], "O1");
        assert_eq!(json["miss_sla_proba"], 0.92);
        assert_eq!(json["status"], "open");
        assert_eq!(json["severity"], "high");
        assert!(json["resolved_at"].is_null());
    }

    #[test]
    fn test_sources_for_matches_transition_table() {
        assert_eq!(
            AlertStatus::sources_for(AlertStatus::Acknowledged),
            vec![AlertStatus::Open]
        );
        assert_eq!(
            AlertStatus::sources_for(AlertStatus::Resolved),
            vec![AlertStatus::Open, AlertStatus::Acknowledged]
        );
        assert!(AlertStatus::sources_for(AlertStatus::Open).is_empty());
    }

    #[test]
    fn test_list_alerts_query_defaults() {
        let query: ListAlertsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 50);
        assert!(query.status.is_none());
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_list_alerts_query_limit_over_max_rejected() {
        let query: ListAlertsQuery = serde_json::from_str(r#"{"limit": 201}"#).unwrap();
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_list_alerts_query_status_filter() {
        let query: ListAlertsQuery =
            serde_json::from_str(r#"{"limit": 10, "status": "acknowledged"}"#).unwrap();
        assert_eq!(query.status, Some(AlertStatus::Acknowledged));
    }

    #[test]
    fn test_resolve_request_notes_optional() {
        let req: ResolveAlertRequest =
            serde_json::from_str(r#"{"actual_sla_missed": false}"#).unwrap();
        assert!(!req.actual_sla_missed);
        assert!(req.resolution_notes.is_none());
    }
}
