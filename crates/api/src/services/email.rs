//! Alert email dispatchers.
//!
//! Supports two providers:
//! - `console`: logs the message (development)
//! - `smtp`: STARTTLS SMTP via lettre

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::services::dispatcher::{test_email_body, TEST_EMAIL_SUBJECT};
use domain::services::{
    AlertContext, AlertDispatcher, DeliveryError, DeliveryResult, TransportCredentials,
};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::EmailConfig;

/// Builds the dispatcher selected by `email.provider`.
pub fn dispatcher_from_config(config: &EmailConfig) -> Arc<dyn AlertDispatcher> {
    match config.provider.as_str() {
        "smtp" => Arc::new(SmtpDispatcher::new(
            config.transport_credentials(),
            config.sender_name.clone(),
            Duration::from_secs(config.timeout_secs),
        )),
        "console" => Arc::new(ConsoleDispatcher::new(config.transport_credentials())),
        provider => {
            warn!(provider = %provider, "Unknown email provider, falling back to console");
            Arc::new(ConsoleDispatcher::new(config.transport_credentials()))
        }
    }
}

/// Console provider. Logs instead of sending.
#[derive(Debug, Clone)]
pub struct ConsoleDispatcher {
    credentials: TransportCredentials,
}

impl ConsoleDispatcher {
    pub fn new(credentials: TransportCredentials) -> Self {
        Self { credentials }
    }

    fn log(&self, subject: &str, body: &str, recipients: &[String]) {
        info!(
            to = ?recipients,
            from = ?self.credentials.sender,
            subject = %subject,
            "Email (console provider)"
        );
        info!(body_text = %body, "Email body (plain text)");
    }
}

#[async_trait]
impl AlertDispatcher for ConsoleDispatcher {
    async fn deliver(&self, alert: &AlertContext, recipients: &[String]) -> DeliveryResult {
        self.log(&alert.subject(), &alert.body(), recipients);
        Ok(())
    }

    async fn send_test(&self, recipients: &[String]) -> DeliveryResult {
        let body = test_email_body(
            self.credentials.host.as_deref().unwrap_or(""),
            self.credentials.port,
            self.credentials.sender.as_deref().unwrap_or(""),
            recipients,
        );
        self.log(TEST_EMAIL_SUBJECT, &body, recipients);
        Ok(())
    }
}

/// SMTP provider. One connection per delivery, no retries.
pub struct SmtpDispatcher {
    credentials: TransportCredentials,
    sender_name: String,
    timeout: Duration,
}

impl SmtpDispatcher {
    pub fn new(credentials: TransportCredentials, sender_name: String, timeout: Duration) -> Self {
        Self {
            credentials,
            sender_name,
            timeout,
        }
    }

    fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, DeliveryError> {
        value
            .as_deref()
            .ok_or_else(|| DeliveryError::Transport(format!("{} is not configured", name)))
    }

    fn build_message(
        &self,
        subject: &str,
        body: String,
        recipients: &[String],
    ) -> Result<Message, DeliveryError> {
        let sender: Address = Self::required(&self.credentials.sender, "sender")?
            .parse()
            .map_err(|e| DeliveryError::InvalidAddress(format!("sender: {}", e)))?;
        let name = (!self.sender_name.is_empty()).then(|| self.sender_name.clone());

        let mut builder = Message::builder()
            .from(Mailbox::new(name, sender))
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| DeliveryError::InvalidAddress(format!("{}: {}", recipient, e)))?;
            builder = builder.to(mailbox);
        }

        builder
            .body(body)
            .map_err(|e| DeliveryError::Message(e.to_string()))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let host = Self::required(&self.credentials.host, "smtp_host")?;
        let username = Self::required(&self.credentials.username, "smtp_username")?;
        let password = Self::required(&self.credentials.password, "smtp_password")?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(self.credentials.port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(self.timeout))
            .build();

        Ok(transport)
    }

    async fn send(&self, subject: &str, body: String, recipients: &[String]) -> DeliveryResult {
        if recipients.is_empty() {
            return Err(DeliveryError::InvalidAddress("no recipients".to_string()));
        }

        let message = self.build_message(subject, body, recipients)?;
        let transport = self.transport()?;

        transport
            .send(message)
            .await
            .map_err(|e| self.classify(&e))?;

        info!(
            to = ?recipients,
            subject = %subject,
            "Email sent via SMTP"
        );
        Ok(())
    }

    fn classify(&self, err: &lettre::transport::smtp::Error) -> DeliveryError {
        if err.is_timeout() {
            return DeliveryError::Timeout(self.timeout);
        }
        match err.status() {
            Some(code) => classify_reply_code(&code.to_string(), err.to_string()),
            None => DeliveryError::Transport(err.to_string()),
        }
    }
}

/// Maps an SMTP reply code onto a delivery error class.
fn classify_reply_code(code: &str, detail: String) -> DeliveryError {
    match code {
        "530" | "534" | "535" => DeliveryError::Authentication(detail),
        "501" | "550" | "553" => DeliveryError::InvalidAddress(detail),
        _ => DeliveryError::Transport(detail),
    }
}

#[async_trait]
impl AlertDispatcher for SmtpDispatcher {
    async fn deliver(&self, alert: &AlertContext, recipients: &[String]) -> DeliveryResult {
        self.send(&alert.subject(), alert.body(), recipients).await
    }

    async fn send_test(&self, recipients: &[String]) -> DeliveryResult {
        let body = test_email_body(
            self.credentials.host.as_deref().unwrap_or(""),
            self.credentials.port,
            self.credentials.sender.as_deref().unwrap_or(""),
            recipients,
        );
        self.send(TEST_EMAIL_SUBJECT, body, recipients).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::Severity;

    fn credentials() -> TransportCredentials {
        TransportCredentials {
            sender: Some("alerts@company.com".to_string()),
            username: Some("alerts".to_string()),
            password: Some("secret".to_string()),
            host: Some("smtp.company.com".to_string()),
            port: 587,
        }
    }

    fn context() -> AlertContext {
        AlertContext {
            order_id: "ORD-9".to_string(),
            probability: 0.91,
            severity: Severity::High,
            distance_km: 3.2,
            items_count: 2,
            hub_load: 0.7,
            traffic_index: 0.6,
            weather_code: "CLEAR".to_string(),
            priority: "NORMAL".to_string(),
            carrier: "BIKE".to_string(),
        }
    }

    fn smtp() -> SmtpDispatcher {
        SmtpDispatcher::new(credentials(), "SLA Monitor".to_string(), Duration::from_secs(1))
    }

    #[test]
    fn test_classify_reply_code() {
        assert!(matches!(
            classify_reply_code("535", "bad credentials".into()),
            DeliveryError::Authentication(_)
        ));
        assert!(matches!(
            classify_reply_code("550", "mailbox unavailable".into()),
            DeliveryError::InvalidAddress(_)
        ));
        assert!(matches!(
            classify_reply_code("421", "service not available".into()),
            DeliveryError::Transport(_)
        ));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let err = smtp()
            .build_message("subject", "body".into(), &["not-an-address".to_string()])
            .unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress(_)));
    }

    #[test]
    fn test_build_message_ok() {
        let message = smtp().build_message(
            "[SLA Alert] Order ORD-9 risk=0.91",
            "body".into(),
            &["ops@company.com".to_string(), "lead@company.com".to_string()],
        );
        assert!(message.is_ok());
    }

    #[test]
    fn test_missing_host_is_transport_error() {
        let mut creds = credentials();
        creds.host = None;
        let dispatcher = SmtpDispatcher::new(creds, String::new(), Duration::from_secs(1));
        assert!(matches!(
            dispatcher.transport(),
            Err(DeliveryError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_smtp_without_recipients_fails_fast() {
        let result = smtp().deliver(&context(), &[]).await;
        assert!(matches!(result, Err(DeliveryError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_console_dispatcher_always_succeeds() {
        let dispatcher = ConsoleDispatcher::new(credentials());
        assert!(dispatcher
            .deliver(&context(), &["ops@company.com".to_string()])
            .await
            .is_ok());
        assert!(dispatcher
            .send_test(&["ops@company.com".to_string()])
            .await
            .is_ok());
    }

    #[test]
    fn test_dispatcher_from_config_unknown_provider() {
        let config = EmailConfig {
            provider: "carrier-pigeon".to_string(),
            ..EmailConfig::default()
        };
        // Falls back to console; building must not panic.
        let _dispatcher = dispatcher_from_config(&config);
    }
}
