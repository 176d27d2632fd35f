//! Persistence layer for the SLA risk monitor.
//!
//! This crate contains:
//! - SQLite pool management and embedded migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations (alert store, action log, settings, predictions, stats, users)

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
