//! Alert dispatcher abstraction.
//!
//! A dispatcher performs one best-effort delivery of an alert to a set of
//! recipients. Failures are returned as [`DeliveryError`] values for the
//! caller to log; they never affect the persisted alert.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{OrderInput, Severity};

/// Classified delivery failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Message build error: {0}")]
    Message(String),
}

impl DeliveryError {
    /// Short label used as a metric tag.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Authentication(_) => "auth_failed",
            DeliveryError::InvalidAddress(_) => "invalid_address",
            DeliveryError::Timeout(_) => "timeout",
            DeliveryError::Transport(_) => "transport_failed",
            DeliveryError::Message(_) => "message_failed",
        }
    }
}

pub type DeliveryResult = Result<(), DeliveryError>;

/// Everything a dispatcher needs to render an alert message.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertContext {
    pub order_id: String,
    pub probability: f64,
    pub severity: Severity,
    pub distance_km: f64,
    pub items_count: i64,
    pub hub_load: f64,
    pub traffic_index: f64,
    pub weather_code: String,
    pub priority: String,
    pub carrier: String,
}

impl AlertContext {
    pub fn from_order(order: &OrderInput, probability: f64) -> Self {
        Self {
            order_id: order.order_id.clone(),
            probability,
            severity: Severity::from_probability(probability),
            distance_km: order.distance_km,
            items_count: order.items_count,
            hub_load: order.hub_load,
            traffic_index: order.traffic_index,
            weather_code: order.weather_code.clone(),
            priority: order.priority.clone(),
            carrier: order.carrier.clone(),
        }
    }

    pub fn subject(&self) -> String {
        format!(
            "[SLA Alert] Order {} risk={:.2}",
            self.order_id, self.probability
        )
    }

    pub fn body(&self) -> String {
        format!(
            "SLA Miss Risk Alert\n\n\
             Order ID: {}\n\
             Risk Probability: {:.2}\n\
             Severity: {}\n\n\
             distance_km: {}\n\
             items_count: {}\n\
             hub_load: {}\n\
             traffic_index: {}\n\
             weather_code: {}\n\
             priority: {}\n\
             carrier: {}\n",
            self.order_id,
            self.probability,
            self.severity,
            self.distance_km,
            self.items_count,
            self.hub_load,
            self.traffic_index,
            self.weather_code,
            self.priority,
            self.carrier,
        )
    }
}

pub const TEST_EMAIL_SUBJECT: &str = "[SLA Alert Test] Configuration Test";

/// Body of the configuration test email.
pub fn test_email_body(host: &str, port: u16, sender: &str, recipients: &[String]) -> String {
    format!(
        "This is a test email from the SLA risk monitor.\n\n\
         If you received this email, the SMTP configuration is working.\n\n\
         Configuration details:\n\
         - SMTP Host: {}\n\
         - SMTP Port: {}\n\
         - From: {}\n\
         - To: {}\n",
        host,
        port,
        sender,
        recipients.join(", ")
    )
}

/// Alert delivery channel.
#[async_trait::async_trait]
pub trait AlertDispatcher: Send + Sync {
    /// Deliver one alert to `recipients`. No retries.
    async fn deliver(&self, alert: &AlertContext, recipients: &[String]) -> DeliveryResult;

    /// Send a configuration test message.
    async fn send_test(&self, recipients: &[String]) -> DeliveryResult;
}

/// Throttle and timeout applied around every delivery.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    pub timeout: Duration,
    pub throttle: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            throttle: Duration::from_secs(1),
        }
    }
}

/// Deliver with the policy's throttle before the send and its timeout around it.
pub async fn deliver_bounded(
    dispatcher: &dyn AlertDispatcher,
    alert: &AlertContext,
    recipients: &[String],
    policy: DeliveryPolicy,
) -> DeliveryResult {
    if !policy.throttle.is_zero() {
        tokio::time::sleep(policy.throttle).await;
    }

    match tokio::time::timeout(policy.timeout, dispatcher.deliver(alert, recipients)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout(policy.timeout)),
    }
}

/// A delivery captured by [`MockDispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDelivery {
    pub subject: String,
    pub recipients: Vec<String>,
}

/// Mock dispatcher for testing. Records deliveries instead of sending.
#[derive(Debug, Default)]
pub struct MockDispatcher {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    /// Artificial latency before each delivery completes.
    pub delay: Option<Duration>,
    deliveries: Mutex<Vec<RecordedDelivery>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock dispatcher that fails every delivery.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Create a mock dispatcher that sleeps before each delivery.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.deliveries.lock().await.clone()
    }

    async fn record(&self, subject: String, recipients: &[String]) -> DeliveryResult {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.simulate_failure {
            tracing::warn!(subject = %subject, "Mock dispatcher simulating failure");
            return Err(DeliveryError::Transport("Simulated failure".to_string()));
        }
        tracing::info!(
            subject = %subject,
            recipients = ?recipients,
            "Mock: Would send alert email"
        );
        self.deliveries.lock().await.push(RecordedDelivery {
            subject,
            recipients: recipients.to_vec(),
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl AlertDispatcher for MockDispatcher {
    async fn deliver(&self, alert: &AlertContext, recipients: &[String]) -> DeliveryResult {
        self.record(alert.subject(), recipients).await
    }

    async fn send_test(&self, recipients: &[String]) -> DeliveryResult {
        self.record(TEST_EMAIL_SUBJECT.to_string(), recipients).await
    }
}
