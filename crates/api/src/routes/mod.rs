//! HTTP route handlers.

pub mod alerts;
pub mod auth;
pub mod health;
pub mod predict;
pub mod settings;
pub mod stats;
