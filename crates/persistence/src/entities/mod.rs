//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod alert;
pub mod alert_action;
pub mod prediction;
pub mod settings;
pub mod stats;
pub mod user;

pub use alert::AlertEntity;
pub use alert_action::AlertActionEntity;
pub use prediction::PredictionEntity;
pub use settings::SettingsEntity;
pub use stats::{BucketRow, CarrierRow, OpsRow, RiskCountsRow};
pub use user::UserEntity;
