use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub twilio: TwilioSettings,
    pub email: EmailSettings,
    pub notifier: NotifierSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
}

/// SMS provider credentials. Left empty, the dispatcher falls back to a
/// logging no-op provider so the rest of the pipeline keeps working.
#[derive(Debug, Deserialize, Clone)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailSettings {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierSettings {
    pub enabled: bool,
    /// Country code digits (no `+`) assumed for bare 10-digit numbers.
    pub default_country_code: String,
    pub sweep_interval_secs: u64,
    pub warmup_delay_secs: u64,
    pub default_reminder_days: i64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("FOODWISE"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 5000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "foodwise")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.issuer", "foodwise")?
            .set_default("twilio.account_sid", "")?
            .set_default("twilio.auth_token", "")?
            .set_default("twilio.from_number", "")?
            .set_default("email.api_url", None::<String>)?
            .set_default("email.api_key", None::<String>)?
            .set_default("email.from", "alerts@foodwise.app")?
            .set_default("notifier.enabled", true)?
            .set_default("notifier.default_country_code", "91")?
            .set_default("notifier.sweep_interval_secs", 3 * 60 * 60)?
            .set_default("notifier.warmup_delay_secs", 5)?
            .set_default("notifier.default_reminder_days", 3)?
            .build()?;

        config.try_deserialize()
    }
}
