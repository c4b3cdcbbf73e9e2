//! Application configuration module
//!
//! Provides the server configuration: the store connection string, the
//! listening port, the directory of static pages, the pool size and the
//! request body limit.
//! Values come from the environment (a `.env` file is loaded by the server
//! binary first) or from [`AppConfigBuilder`] in tests.

use thiserror::Error;

/// Connection string used when `DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "sqlite:plancollab.db?mode=rwc";

/// Port used when neither `PORT` nor `SERVER_PORT` is set
pub const DEFAULT_PORT: u16 = 3000;

/// Directory of static pages used when `STATIC_DIR` is not set
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Pool size used when `DATABASE_MAX_CONNECTIONS` is not set
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Request body limit used when `MAX_BODY_BYTES` is not set (50 MiB)
///
/// Plan images travel inline as base64 data URIs, so plan and import
/// bodies are far above axum's 2 MB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Store connection string
    pub database_url: String,
    /// Listening port
    pub port: u16,
    /// Directory served for every non-API path
    pub static_dir: String,
    /// Upper bound of pooled store connections
    pub max_connections: u32,
    /// Largest accepted JSON request body, in bytes
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load the configuration from environment variables
    ///
    /// `PORT` wins over `SERVER_PORT`. Unset variables fall back to the
    /// defaults; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Some(url) = lookup("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(port) = lookup("PORT").or_else(|| lookup("SERVER_PORT")) {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
            builder = builder.port(port);
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            builder = builder.static_dir(dir);
        }
        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            let max = max
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidMaxConnections(max.clone()))?;
            builder = builder.max_connections(max);
        }
        if let Some(limit) = lookup("MAX_BODY_BYTES") {
            let limit = limit
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidBodyLimit(limit.clone()))?;
            builder = builder.max_body_bytes(limit);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("DATABASE_URL"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections("0".to_string()));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidBodyLimit("0".to_string()));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    database_url: Option<String>,
    port: Option<u16>,
    static_dir: Option<String>,
    max_connections: Option<u32>,
    max_body_bytes: Option<usize>,
}

impl AppConfigBuilder {
    /// Set the store connection string
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the listening port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the static pages directory
    pub fn static_dir(mut self, dir: impl Into<String>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Set the pool size
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Set the request body limit in bytes
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            database_url: self.database_url.unwrap_or(defaults.database_url),
            port: self.port.unwrap_or(defaults.port),
            static_dir: self.static_dir.unwrap_or(defaults.static_dir),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
            max_body_bytes: self.max_body_bytes.unwrap_or(defaults.max_body_bytes),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid database max connections: {0}")]
    InvalidMaxConnections(String),
    #[error("invalid max body bytes: {0}")]
    InvalidBodyLimit(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
