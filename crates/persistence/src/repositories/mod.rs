//! Repository implementations.

pub mod alert;
pub mod alert_action;
pub mod prediction;
pub mod settings;
pub mod stats;
pub mod user;

pub use alert::{AlertRepository, AlertStoreError};
pub use alert_action::AlertActionRepository;
pub use prediction::PredictionRepository;
pub use settings::SettingsRepository;
pub use stats::StatsRepository;
pub use user::UserRepository;
