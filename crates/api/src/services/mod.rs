//! Application services.

pub mod alert_engine;
pub mod auth;
pub mod email;

pub use alert_engine::{AlertEngine, EvaluationOutcome, NotificationOutcome};
pub use auth::{AuthError, AuthService};
pub use email::{dispatcher_from_config, ConsoleDispatcher, SmtpDispatcher};
