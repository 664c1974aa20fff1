//! # configs
//!
//! Layered settings for PetConnect. Sources, lowest priority first:
//!
//! 1. defaults baked into the structs below
//! 2. `config/default.toml` (optional)
//! 3. `config/{APP_ENV}.toml` (optional)
//! 4. `PETCONNECT__SECTION__KEY` environment variables
//!
//! A `.env` file, when present, is loaded into the environment first.

use config::{Config, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "PETCONNECT";
pub const DEV_JWT_SECRET: &str = "petconnect-dev-secret-change-me";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `development`, `test` or `production`; taken from `APP_ENV`.
    pub environment: String,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub media: MediaSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Postgres URL. Without one the server runs on the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    pub upload_dir: String,
    pub url_prefix: String,
    /// Bytes per file.
    pub max_file_size: usize,
    pub max_files: usize,
    pub allowed_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
    pub json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            auth: AuthSettings::default(),
            media: MediaSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            cors_origins: vec!["http://localhost:3000".into()],
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::from(DEV_JWT_SECRET),
            token_ttl_hours: 24 * 7,
        }
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            upload_dir: "uploads".into(),
            url_prefix: "/uploads".into(),
            max_file_size: 5 * 1024 * 1024,
            max_files: 10,
            allowed_types: ["jpeg", "png", "gif", "webp"].map(String::from).to_vec(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

impl Settings {
    /// Loads `.env`, then every layer for the environment named by `APP_ENV`.
    pub fn load() -> Result<Self, SettingsError> {
        let _ = dotenvy::dotenv();
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let builder = Config::builder()
            .set_override("environment", environment.as_str())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(env_source());
        Self::from_builder(builder)
    }

    /// Deserializes and validates an assembled builder.
    pub fn from_builder(
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must be greater than 0".into()));
        }
        let secret = self.auth.jwt_secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(SettingsError::Invalid("auth.jwt_secret must not be empty".into()));
        }
        if self.is_production() && secret == DEV_JWT_SECRET {
            return Err(SettingsError::Invalid(
                "auth.jwt_secret must be set explicitly in production".into(),
            ));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(SettingsError::Invalid("auth.token_ttl_hours must be positive".into()));
        }
        if self.media.max_file_size == 0 || self.media.max_files == 0 {
            return Err(SettingsError::Invalid(
                "media.max_file_size and media.max_files must be positive".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(SettingsError::Invalid("database.max_connections must be positive".into()));
        }
        Ok(())
    }
}

/// `PETCONNECT__AUTH__JWT_SECRET` → `auth.jwt_secret`. List values are
/// comma-separated.
pub fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
        .with_list_parse_key("media.allowed_types")
        .try_parsing(true)
}
