//! Dashboard statistics read models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-hour prediction counts for a single day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyBucket {
    /// Two-digit hour, `"00"`..`"23"`.
    pub hour: String,
    pub total: i64,
    pub risky: i64,
}

/// Response for `GET /stats/today`.
#[derive(Debug, Clone, Serialize)]
pub struct TodayStats {
    pub date: String,
    pub total_predictions: i64,
    pub high_risk: i64,
    pub medium_risk: i64,
    pub low_risk: i64,
    pub risk_percent: f64,
    pub hourly: Vec<HourlyBucket>,
}

/// Daily aggregate for the trends view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    pub day: String,
    pub total: i64,
    pub risky: i64,
    pub avg_risk: f64,
}

/// High-risk prediction count for one hour slot of the last 24 hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRisk {
    /// `"HH:00"`
    pub time: String,
    pub risk: i64,
}

/// A slice of the risk distribution pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSlice {
    pub name: String,
    pub value: i64,
    pub color: String,
}

/// On-time vs delayed percentages for one carrier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierPerformance {
    pub name: String,
    #[serde(rename = "onTime")]
    pub on_time: f64,
    pub delayed: f64,
}

/// Response for `GET /stats/trends`.
#[derive(Debug, Clone, Serialize)]
pub struct TrendStats {
    pub hourly: Vec<HourlyRisk>,
    pub risk_distribution: Vec<RiskSlice>,
    pub carrier_performance: Vec<CarrierPerformance>,
    pub daily: Vec<DailyTrend>,
}

/// Query parameters for `GET /stats/trends`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TrendsQuery {
    #[serde(default = "default_trend_days")]
    #[validate(range(min = 1, max = 30, message = "Days must be between 1 and 30"))]
    pub days: i64,
}

fn default_trend_days() -> i64 {
    7
}

/// Response for `GET /stats/ops`: alert handling KPIs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpsMetrics {
    pub total_alerts: i64,
    pub resolved: i64,
    pub resolution_rate: f64,
    pub mean_response_time_sec: i64,
    pub false_positive_rate: f64,
}

impl OpsMetrics {
    /// Derives the rates from raw counts.
    pub fn from_counts(
        total_alerts: i64,
        resolved: i64,
        false_positives: i64,
        avg_response_secs: Option<f64>,
    ) -> Self {
        Self {
            total_alerts,
            resolved,
            resolution_rate: percent(resolved, total_alerts, 2),
            mean_response_time_sec: avg_response_secs.unwrap_or(0.0) as i64,
            false_positive_rate: percent(false_positives, resolved, 2),
        }
    }
}

/// Display colour for a risk band name.
pub fn risk_color(name: &str) -> &'static str {
    match name {
        "High Risk" => "#EF4444",
        "Medium Risk" => "#F59E0B",
        "Low Risk" => "#10B981",
        _ => "#6366f1",
    }
}

/// `part / whole * 100`, rounded to `decimals`, or 0 when `whole` is 0.
pub fn percent(part: i64, whole: i64, decimals: i32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    ((part as f64 / whole as f64) * 100.0 * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 3, 2), 33.33);
        assert_eq!(percent(2, 3, 1), 66.7);
        assert_eq!(percent(5, 0, 2), 0.0);
        assert_eq!(percent(4, 4, 2), 100.0);
    }

    #[test]
    fn test_ops_metrics_from_counts() {
        let ops = OpsMetrics::from_counts(8, 4, 1, Some(125.9));
        assert_eq!(ops.resolution_rate, 50.0);
        assert_eq!(ops.false_positive_rate, 25.0);
        assert_eq!(ops.mean_response_time_sec, 125);
    }

    #[test]
    fn test_ops_metrics_empty() {
        let ops = OpsMetrics::from_counts(0, 0, 0, None);
        assert_eq!(ops.resolution_rate, 0.0);
        assert_eq!(ops.false_positive_rate, 0.0);
        assert_eq!(ops.mean_response_time_sec, 0);
    }

    #[test]
    fn test_risk_color() {
        assert_eq!(risk_color("High Risk"), "#EF4444");
        assert_eq!(risk_color("Medium Risk"), "#F59E0B");
        assert_eq!(risk_color("Low Risk"), "#10B981");
        assert_eq!(risk_color("Other"), "#6366f1");
    }

    #[test]
    fn test_carrier_performance_serializes_on_time_camel() {
        let perf = CarrierPerformance {
            name: "VAN".to_string(),
            on_time: 80.0,
            delayed: 20.0,
        };
        let json = serde_json::to_string(&perf).unwrap();
        assert!(json.contains("\"onTime\":80.0"));
    }

    #[test]
    fn test_trends_query_bounds() {
        let ok: TrendsQuery = serde_json::from_str(r#"{"days": 30}"#).unwrap();
        assert!(ok.validate().is_ok());
        let bad: TrendsQuery = serde_json::from_str(r#"{"days": 31}"#).unwrap();
        assert!(bad.validate().is_err());
        let default: TrendsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(default.days, 7);
    }
}
