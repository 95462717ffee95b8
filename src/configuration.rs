use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use governor::Quota;
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::chat_client::ChatClient;
use crate::domain::EmailAddress;
use crate::email_client::EmailClient;

#[derive(Clone, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email_client: EmailClientSettings,
    pub chat_client: ChatClientSettings,
    pub notifications: NotificationSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Origin allowed by CORS. When unset, any origin is accepted.
    pub frontend_origin: Option<String>,
    /// When true, 500 responses carry the underlying error message verbatim.
    /// Production keeps this off and returns the route's fallback text.
    pub expose_error_details: bool,
}

#[derive(Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        self.connect_options_without_db()
            .database(&self.database_name)
    }

    pub fn connect_options_without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }
}

#[derive(Clone, serde::Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub authorization_token: Secret<String>,
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn client(self) -> EmailClient {
        let sender = self.sender().expect("Invalid sender email address.");
        let timeout = self.timeout();
        EmailClient::new(self.base_url, sender, self.authorization_token, timeout)
    }

    pub fn sender(&self) -> Result<EmailAddress, String> {
        EmailAddress::parse(self.sender_email.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Clone, serde::Deserialize)]
pub struct ChatClientSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
    /// Model identifier forwarded verbatim on every chat completion request.
    pub model: String,
    pub timeout_milliseconds: u64,
}

impl ChatClientSettings {
    pub fn client(self) -> ChatClient {
        let timeout = Duration::from_millis(self.timeout_milliseconds);
        ChatClient::new(self.base_url, self.api_key, self.model, timeout)
    }
}

#[derive(Clone, serde::Deserialize)]
pub struct NotificationSettings {
    pub admin_email: String,
    /// Base URL of the public site; unsubscribe links in welcome emails point here.
    pub frontend_base_url: String,
    pub pdf_guide_path: PathBuf,
}

impl NotificationSettings {
    pub fn admin(&self) -> Result<EmailAddress, String> {
        EmailAddress::parse(self.admin_email.clone())
    }
}

#[derive(Clone, serde::Deserialize)]
pub struct RateLimitSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_requests: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_seconds: u64,
}

impl RateLimitSettings {
    /// Translates the max-per-window contract into a `governor` quota:
    /// a full burst of `max_requests`, replenished evenly over the window.
    pub fn quota(&self) -> Result<Quota, String> {
        let max_requests = NonZeroU32::new(self.max_requests)
            .ok_or("rate_limit.max_requests must be greater than zero")?;
        let replenish_period =
            Duration::from_secs(self.window_seconds) / max_requests.get();
        Quota::with_period(replenish_period)
            .map(|quota| quota.allow_burst(max_requests))
            .ok_or_else(|| "rate_limit.window_seconds must be greater than zero".into())
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment; default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // e.g. `APP_NOTIFICATIONS__ADMIN_EMAIL=ops@example.com` would set
        // `Settings.notifications.admin_email`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environments for the application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either 'local' or 'production'.",
                other
            )),
        }
    }
}
