//! Settings of the application, read from `settings.toml` (or the file named
//! by `BOUTIQUE_SETTINGS`) and overridden by `BOUTIQUE__SECTION__KEY`
//! environment variables.
//!
//! See `settings.example.toml` for every key.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const SETTINGS_PATH_VAR: &str = "BOUTIQUE_SETTINGS";

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Database {
    /// sea-orm connection url, `sqlite:` or `postgres:`.
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    /// argon2 PHC string, see `boutique_admin hash-password`.
    pub admin_password_hash: String,
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Base URL the server is reachable at, used for upload URLs.
    pub public_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    pub admin_id: Option<i64>,
    /// When set, updates come through the server's webhook route instead of
    /// long polling.
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub batch_size: Option<usize>,
    pub batch_delay_ms: Option<u64>,
    pub retry_delay_ms: Option<u64>,
    pub session_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub database: Database,
    pub server: Option<Server>,
    pub telegram: Option<Telegram>,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var(SETTINGS_PATH_VAR).unwrap_or_else(|_| "settings".to_string());
        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("BOUTIQUE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
