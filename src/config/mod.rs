use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub booking: BookingConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_duration_hours: i64,
}

/// Marketplace-wide booking defaults. Per-booking values override these at
/// creation time.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    pub default_revision_limit: i64,
    pub default_cancellation_window_hours: i64,
    pub default_advance_percentage: i64,
    /// Platform commission kept from every charge, in percent.
    pub platform_fee_percent: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.token_duration_hours", 24)?
            .set_default("booking.default_revision_limit", 2)?
            .set_default("booking.default_cancellation_window_hours", 24)?
            .set_default("booking.default_advance_percentage", 50)?
            .set_default("booking.platform_fee_percent", 10)?
            .set_default("stripe.enabled", false)?
            .set_default("email.enabled", false)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with ATELIER__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("ATELIER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://atelier.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_duration_hours: 24,
            },
            booking: BookingConfig {
                default_revision_limit: 2,
                default_cancellation_window_hours: 24,
                default_advance_percentage: 50,
                platform_fee_percent: 10,
            },
            stripe: StripeConfig::default(),
            email: EmailConfig::default(),
        }
    }
}
