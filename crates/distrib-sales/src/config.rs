//! Sales service configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use distrib_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use distrib_db::DbConfig;

/// Sales service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size (default: 5)
    pub max_connections: u32,

    /// How long a confirm waits for another writer, in milliseconds (default: 5000)
    pub busy_timeout_ms: u64,

    /// Page size when a listing does not ask for one (default: 10)
    pub default_page_size: u32,
}

impl Default for SalesConfig {
    fn default() -> Self {
        SalesConfig {
            db_path: PathBuf::from("./distrib.db"),
            max_connections: 5,
            busy_timeout_ms: 5_000,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SalesConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                     | Default        |
    /// |------------------------------|----------------|
    /// | `DISTRIB_DB_PATH`            | `./distrib.db` |
    /// | `DISTRIB_DB_MAX_CONNECTIONS` | `5`            |
    /// | `DISTRIB_DB_BUSY_TIMEOUT_MS` | `5000`         |
    /// | `DISTRIB_DEFAULT_PAGE_SIZE`  | `10`           |
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SalesConfig::default();

        let config = SalesConfig {
            db_path: lookup("DISTRIB_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            max_connections: parse_or(&lookup, "DISTRIB_DB_MAX_CONNECTIONS", defaults.max_connections)?,

            busy_timeout_ms: parse_or(&lookup, "DISTRIB_DB_BUSY_TIMEOUT_MS", defaults.busy_timeout_ms)?,

            default_page_size: parse_or(
                &lookup,
                "DISTRIB_DEFAULT_PAGE_SIZE",
                defaults.default_page_size,
            )?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DISTRIB_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.default_page_size == 0 || config.default_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue(
                "DISTRIB_DEFAULT_PAGE_SIZE".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone())
            .max_connections(self.max_connections)
            .min_connections(1)
            .busy_timeout(self.busy_timeout())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
