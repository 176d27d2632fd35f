use domain::models::NotificationSettings;
use domain::services::{DeliveryPolicy, TransportCredentials};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// JWT authentication configuration
    pub jwt: JwtAuthConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Alert email configuration
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub model: ModelConfig,
    /// Defaults seeded into the settings row on first access
    #[serde(default)]
    pub alerts: AlertsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(cfg: &DatabaseConfig) -> Self {
        Self {
            url: cfg.url.clone(),
            max_connections: cfg.max_connections,
            min_connections: cfg.min_connections,
            connect_timeout_secs: cfg.connect_timeout_secs,
            idle_timeout_secs: cfg.idle_timeout_secs,
            busy_timeout_secs: cfg.busy_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    5
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_busy_timeout() -> u64 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// HMAC secret used to sign access tokens
    pub secret: String,

    /// Access token expiration in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

fn default_access_token_expiry() -> i64 {
    3600
}

fn default_jwt_leeway() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// When set, registration requires a matching `signup_key`
    #[serde(default)]
    pub signup_key: Option<String>,
}

impl AuthConfig {
    pub fn signup_key(&self) -> Option<&str> {
        self.signup_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Alert email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Email provider: smtp, or console (for development)
    #[serde(default = "default_email_provider")]
    pub provider: String,

    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    /// Sender email address (From header)
    #[serde(default)]
    pub sender_email: String,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Upper bound on a single delivery attempt
    #[serde(default = "default_email_timeout")]
    pub timeout_secs: u64,

    /// Pause before each delivery attempt
    #[serde(default = "default_email_throttle")]
    pub throttle_ms: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_email_provider(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            sender_email: String::new(),
            sender_name: default_sender_name(),
            timeout_secs: default_email_timeout(),
            throttle_ms: default_email_throttle(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl EmailConfig {
    pub fn transport_credentials(&self) -> TransportCredentials {
        TransportCredentials {
            sender: non_empty(&self.sender_email),
            username: non_empty(&self.smtp_username),
            password: non_empty(&self.smtp_password),
            host: non_empty(&self.smtp_host),
            port: self.smtp_port,
        }
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            throttle: Duration::from_millis(self.throttle_ms),
        }
    }
}

fn default_email_provider() -> String {
    "console".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender_name() -> String {
    "SLA Monitor".to_string()
}

fn default_email_timeout() -> u64 {
    10
}

fn default_email_throttle() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the logistic model weights JSON
    #[serde(default = "default_model_path")]
    pub weights_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: default_model_path(),
        }
    }
}

fn default_model_path() -> String {
    "models/risk_model.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,

    #[serde(default = "default_alerts_enabled")]
    pub default_enabled: bool,

    #[serde(default = "default_recipients")]
    pub default_recipients: Vec<String>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            default_enabled: default_alerts_enabled(),
            default_recipients: default_recipients(),
        }
    }
}

impl AlertsConfig {
    pub fn default_settings(&self) -> NotificationSettings {
        NotificationSettings::new(
            self.default_threshold,
            self.default_enabled,
            self.default_recipients.clone(),
        )
    }
}

fn default_threshold() -> f64 {
    0.80
}

fn default_alerts_enabled() -> bool {
    true
}

fn default_recipients() -> Vec<String> {
    vec!["ops@company.com".to_string()]
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SLA__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SLA").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides, without touching
    /// the file system.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8000
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 5
            min_connections = 1

            [logging]
            level = "info"
            format = "json"

            [jwt]
            secret = "test-secret"
            access_token_expiry_secs = 3600

            [email]
            provider = "console"
            throttle_ms = 0
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SLA__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.alerts.default_threshold) {
            return Err(ConfigValidationError::InvalidValue(
                "alerts.default_threshold must be between 0 and 1".to_string(),
            ));
        }

        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SLA__JWT__SECRET environment variable must be set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
