use serde::Deserialize;
use service_core::config::{self as core_config, Environment, TelemetryConfig};
use service_core::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Study that `/` redirects to.
    #[serde(default = "default_study_slug")]
    pub default_study_slug: String,
}

fn default_static_dir() -> String {
    "survey-service/static".to_string()
}

fn default_study_slug() -> String {
    "demo".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// SQLite URL, e.g. `sqlite://survey.db` or `sqlite::memory:`.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    /// Only send the session cookie over HTTPS.
    #[serde(default)]
    pub secure_cookie: bool,
    /// Sessions expire after this many hours without a request.
    #[serde(default = "default_inactivity_hours")]
    pub inactivity_hours: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            secure_cookie: false,
            inactivity_hours: default_inactivity_hours(),
        }
    }
}

fn default_inactivity_hours() -> i64 {
    24
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let environment = Environment::from_env()?;
    let directory = core_config::configuration_directory("survey-service")?;
    core_config::load(&directory, environment)
}
