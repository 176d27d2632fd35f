//! Domain services for the SLA risk monitor.

pub mod dispatcher;
pub mod notification;
pub mod risk_model;

pub use dispatcher::{
    deliver_bounded, AlertContext, AlertDispatcher, DeliveryError, DeliveryPolicy,
    DeliveryResult, MockDispatcher,
};
pub use notification::{
    ConfigCheck, GateDecision, InMemorySettingsStore, NotificationGate, SettingsError,
    SettingsStore, SkipReason, TransportCredentials,
};
pub use risk_model::{FeatureVector, FixedRiskModel, LogisticRiskModel, ModelError, RiskModel};
