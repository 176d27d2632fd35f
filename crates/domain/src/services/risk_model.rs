//! Feature construction and the SLA-miss risk model.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::OrderInput;

/// Number of model input features.
pub const FEATURE_COUNT: usize = 9;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model file not found at {0}")]
    NotFound(String),

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model expects {FEATURE_COUNT} weights, got {0}")]
    WeightCount(usize),

    #[error("Model weights must be finite")]
    NonFinite,
}

fn weather_code(value: &str) -> f64 {
    match value.trim().to_ascii_uppercase().as_str() {
        "CLEAR" => 0.0,
        "CLOUDS" => 1.0,
        "RAIN" => 2.0,
        _ => 0.0,
    }
}

fn priority_code(value: &str) -> f64 {
    match value.trim().to_ascii_uppercase().as_str() {
        "LOW" => 0.0,
        "NORMAL" => 1.0,
        "HIGH" => 2.0,
        _ => 1.0,
    }
}

fn carrier_code(value: &str) -> f64 {
    match value.trim().to_ascii_uppercase().as_str() {
        "BIKE" => 0.0,
        "SCOOTER" => 1.0,
        "CAR" => 2.0,
        "VAN" => 3.0,
        _ => 0.0,
    }
}

/// Model input, in fixed order:
/// `[age_min, promise_delta_min, distance_km, items_count, hub_load,
///   traffic_index, weather, priority, carrier]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_order(order: &OrderInput, now: DateTime<Utc>) -> Self {
        let minutes = |d: chrono::Duration| d.num_milliseconds() as f64 / 60_000.0;

        Self([
            minutes(now - order.created_at),
            minutes(order.promised_at - now),
            order.distance_km,
            order.items_count as f64,
            order.hub_load,
            order.traffic_index,
            weather_code(&order.weather_code),
            priority_code(&order.priority),
            carrier_code(&order.carrier),
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Scores a feature vector with a probability of missing the SLA.
pub trait RiskModel: Send + Sync {
    /// Probability in `[0, 1]`.
    fn predict(&self, features: &FeatureVector) -> f64;
}

#[derive(Debug, Deserialize)]
struct LogisticWeights {
    weights: Vec<f64>,
    bias: f64,
}

/// Logistic regression over the nine order features.
#[derive(Debug, Clone)]
pub struct LogisticRiskModel {
    weights: [f64; FEATURE_COUNT],
    bias: f64,
}

impl LogisticRiskModel {
    pub fn new(weights: [f64; FEATURE_COUNT], bias: f64) -> Result<Self, ModelError> {
        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::NonFinite);
        }
        Ok(Self { weights, bias })
    }

    /// Parse `{"weights": [..9 numbers..], "bias": n}`.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let raw: LogisticWeights = serde_json::from_str(json)?;
        let weights: [f64; FEATURE_COUNT] = raw
            .weights
            .as_slice()
            .try_into()
            .map_err(|_| ModelError::WeightCount(raw.weights.len()))?;
        Self::new(weights, raw.bias)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl RiskModel for LogisticRiskModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let z = self
            .weights
            .iter()
            .zip(features.as_slice())
            .fold(self.bias, |acc, (w, x)| acc + w * x);
        let p = 1.0 / (1.0 + (-z).exp());
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }
}

/// Model that always returns the same probability. Used in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedRiskModel(pub f64);

impl RiskModel for FixedRiskModel {
    fn predict(&self, _features: &FeatureVector) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}
