//! Server configuration.
//!
//! Values come from environment variables, optionally layered over a TOML
//! file named by `MEDICARE_CONFIG`. Unset keys fall back to defaults.
//!
//! ```text
//!   defaults ──► MEDICARE_CONFIG file ──► MEDICARE_* env vars ──► validate()
//! ```

use std::env;
use std::fs;

use serde::{Deserialize, Serialize};

pub const DEV_JWT_SECRET: &str = "medicare-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Secret for signing session tokens
    pub jwt_secret: String,

    /// Session lifetime in seconds
    pub session_ttl_secs: i64,

    /// Insert the sample catalog when the medicines table is empty
    pub seed_sample_data: bool,

    /// Prefix for amounts on receipts and reports
    pub currency_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            database_path: "./pharmacy.db".to_string(),
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_ttl_secs: 8 * 60 * 60,
            seed_sample_data: false,
            currency_prefix: medicare_core::DEFAULT_CURRENCY_PREFIX.to_string(),
        }
    }
}

/// Keys a config file may set. Anything missing keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind_addr: Option<String>,
    port: Option<u16>,
    database_path: Option<String>,
    db_max_connections: Option<u32>,
    jwt_secret: Option<String>,
    session_ttl_secs: Option<i64>,
    seed_sample_data: Option<bool>,
    currency_prefix: Option<String>,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which plays the role of the
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(path) = lookup("MEDICARE_CONFIG") {
            let text = fs::read_to_string(&path).map_err(|e| ConfigError::File {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            config.apply_file(&text).map_err(|reason| ConfigError::File { path, reason })?;
        }

        if let Some(v) = lookup("MEDICARE_BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Some(v) = lookup("MEDICARE_PORT") {
            config.port = parse_var("MEDICARE_PORT", &v)?;
        }
        if let Some(v) = lookup("MEDICARE_DATABASE_PATH") {
            config.database_path = v;
        }
        if let Some(v) = lookup("MEDICARE_DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse_var("MEDICARE_DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("MEDICARE_JWT_SECRET") {
            config.jwt_secret = v;
        }
        if let Some(v) = lookup("MEDICARE_SESSION_TTL_SECS") {
            config.session_ttl_secs = parse_var("MEDICARE_SESSION_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("MEDICARE_SEED_SAMPLE_DATA") {
            config.seed_sample_data = parse_var("MEDICARE_SEED_SAMPLE_DATA", &v)?;
        }
        if let Some(v) = lookup("MEDICARE_CURRENCY_PREFIX") {
            config.currency_prefix = v;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, text: &str) -> Result<(), String> {
        let file: FileConfig = toml::from_str(text).map_err(|e| e.to_string())?;

        if let Some(v) = file.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.database_path {
            self.database_path = v;
        }
        if let Some(v) = file.db_max_connections {
            self.db_max_connections = v;
        }
        if let Some(v) = file.jwt_secret {
            self.jwt_secret = v;
        }
        if let Some(v) = file.session_ttl_secs {
            self.session_ttl_secs = v;
        }
        if let Some(v) = file.seed_sample_data {
            self.seed_sample_data = v;
        }
        if let Some(v) = file.currency_prefix {
            self.currency_prefix = v;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("MEDICARE_DB_MAX_CONNECTIONS".to_string()));
        }
        if self.session_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("MEDICARE_SESSION_TTL_SECS".to_string()));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("MEDICARE_JWT_SECRET".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("MEDICARE_DATABASE_PATH".to_string()));
        }
        Ok(())
    }

    /// `bind_addr:port`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Cannot load config file {path}: {reason}")]
    File { path: String, reason: String },
}
