//! Process configuration read from environment variables.

use std::env;
use std::net::SocketAddr;
use thiserror::Error;

/// Variable holding the listen address.
pub const BIND_ADDR_VAR: &str = "TASKTRAIL_BIND_ADDR";
/// Variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Variable holding the connection pool size.
pub const POOL_SIZE_VAR: &str = "TASKTRAIL_DB_POOL_SIZE";
/// Variable selecting the log output format.
pub const LOG_FORMAT_VAR: &str = "TASKTRAIL_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// `PostgreSQL` URL; `None` selects the in-memory backend.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub db_pool_size: u32,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set to an
    /// unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set to an
    /// unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_bind = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw_bind
            .parse::<SocketAddr>()
            .map_err(|err| invalid(BIND_ADDR_VAR, &raw_bind, &err))?;

        let database_url = lookup(DATABASE_URL_VAR).filter(|url| !url.trim().is_empty());

        let db_pool_size = match lookup(POOL_SIZE_VAR) {
            None => DEFAULT_POOL_SIZE,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => return Err(invalid(POOL_SIZE_VAR, &raw, &"must be at least 1")),
                Ok(size) => size,
                Err(err) => return Err(invalid(POOL_SIZE_VAR, &raw, &err)),
            },
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            None => LogFormat::Text,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "text" | "" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => return Err(invalid(LOG_FORMAT_VAR, &raw, &"expected text or json")),
            },
        };

        Ok(Self {
            bind_addr,
            database_url,
            db_pool_size,
            log_format,
        })
    }
}

fn invalid(name: &'static str, value: &str, reason: &impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_owned(),
        reason: reason.to_string(),
    }
}
