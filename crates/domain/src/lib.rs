//! Domain layer for the SLA risk monitor.
//!
//! This crate contains:
//! - Domain models (Alert, AlertAction, NotificationSettings, Prediction, User)
//! - The notification gate, dispatcher trait and risk model

pub mod models;
pub mod services;
