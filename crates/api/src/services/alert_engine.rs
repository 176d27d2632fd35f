//! Alert evaluation: record, gate, dispatch.
//!
//! A risky evaluation is first recorded in the alert store (deduplicated per
//! order), then the notification gate decides whether to email. Delivery runs
//! on a spawned task so a slow or failing SMTP server never holds up the
//! request, and a delivery failure never touches the recorded alert.

use std::sync::Arc;

use domain::models::{Alert, OrderInput};
use domain::services::{
    deliver_bounded, AlertContext, AlertDispatcher, DeliveryError, DeliveryPolicy, DeliveryResult,
    GateDecision, NotificationGate, SettingsStore, SkipReason,
};
use persistence::repositories::AlertRepository;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::middleware::metrics;

/// What happened to the notification for one evaluation.
#[derive(Debug)]
pub enum NotificationOutcome {
    /// Delivery was spawned; the handle resolves to its result.
    Dispatched {
        recipients: Vec<String>,
        handle: JoinHandle<DeliveryResult>,
    },
    Skipped(SkipReason),
}

#[derive(Debug)]
pub struct EvaluationOutcome {
    /// `None` when the alert could not be persisted.
    pub alert: Option<Alert>,
    pub created: bool,
    pub notification: NotificationOutcome,
}

pub struct AlertEngine {
    alerts: AlertRepository,
    settings: Arc<dyn SettingsStore>,
    gate: NotificationGate,
    dispatcher: Arc<dyn AlertDispatcher>,
    policy: DeliveryPolicy,
    default_threshold: f64,
}

impl AlertEngine {
    pub fn new(
        alerts: AlertRepository,
        settings: Arc<dyn SettingsStore>,
        gate: NotificationGate,
        dispatcher: Arc<dyn AlertDispatcher>,
        policy: DeliveryPolicy,
        default_threshold: f64,
    ) -> Self {
        Self {
            alerts,
            settings,
            gate,
            dispatcher,
            policy,
            default_threshold,
        }
    }

    pub fn gate(&self) -> &NotificationGate {
        &self.gate
    }

    /// Sends the configuration test email, bounded by the delivery timeout.
    pub async fn send_test(&self, recipients: &[String]) -> DeliveryResult {
        let timeout = self.policy.timeout;
        match tokio::time::timeout(timeout, self.dispatcher.send_test(recipients)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(timeout)),
        }
    }

    /// Threshold from the settings store, or the configured default when the
    /// store cannot be read.
    pub async fn current_threshold(&self) -> f64 {
        match self.settings.load().await {
            Ok(settings) => settings.threshold,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = self.default_threshold,
                    "Settings unavailable, using default threshold"
                );
                self.default_threshold
            }
        }
    }

    /// Records an alert for `order` unless an unresolved one already exists,
    /// then attempts notification.
    ///
    /// Notification does not depend on the record: duplicates and persistence
    /// failures still go through the gate.
    pub async fn evaluate(
        &self,
        order: &OrderInput,
        probability: f64,
        threshold: f64,
    ) -> EvaluationOutcome {
        let (alert, created) = match self
            .alerts
            .record_if_new(&order.order_id, probability, threshold)
            .await
        {
            Ok((alert, true)) => {
                tracing::info!(
                    alert_id = alert.id,
                    order_id = %alert.order_id,
                    severity = %alert.severity,
                    probability = probability,
                    "Alert created"
                );
                metrics::record_alert_created(alert.severity);
                (Some(alert), true)
            }
            Ok((alert, false)) => {
                tracing::info!(
                    alert_id = alert.id,
                    order_id = %alert.order_id,
                    status = %alert.status,
                    "Unresolved alert already exists, skipping duplicate record"
                );
                metrics::record_alert_deduplicated();
                (Some(alert), false)
            }
            Err(e) => {
                tracing::error!(
                    order_id = %order.order_id,
                    error = %e,
                    "Failed to persist alert, attempting notification anyway"
                );
                metrics::record_alert_persist_failure();
                (None, false)
            }
        };

        let notification = match self.gate.evaluate().await {
            GateDecision::Notify { recipients } => {
                let context = AlertContext::from_order(order, probability);
                let handle = self.spawn_delivery(context, recipients.clone());
                NotificationOutcome::Dispatched { recipients, handle }
            }
            GateDecision::Skip(reason) => {
                tracing::info!(
                    order_id = %order.order_id,
                    reason = %reason,
                    "Notification skipped"
                );
                metrics::record_notification(reason.as_label());
                NotificationOutcome::Skipped(reason)
            }
        };

        EvaluationOutcome {
            alert,
            created,
            notification,
        }
    }

    fn spawn_delivery(
        &self,
        context: AlertContext,
        recipients: Vec<String>,
    ) -> JoinHandle<DeliveryResult> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let policy = self.policy;

        tokio::spawn(
            async move {
                let result =
                    deliver_bounded(dispatcher.as_ref(), &context, &recipients, policy).await;
                match &result {
                    Ok(()) => {
                        tracing::info!(
                            order_id = %context.order_id,
                            recipients = recipients.len(),
                            "Alert notification sent"
                        );
                        metrics::record_notification("sent");
                    }
                    Err(e) => {
                        tracing::error!(
                            order_id = %context.order_id,
                            error = %e,
                            "Alert notification failed"
                        );
                        metrics::record_notification(e.as_label());
                    }
                }
                result
            }
            .instrument(tracing::Span::current()),
        )
    }
}
