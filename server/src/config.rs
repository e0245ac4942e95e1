//! Configuration management for the todo-kv server.
//!
//! Loads configuration from environment variables with defaults. A `.env`
//! file is read first by the binary, so both work.
//!
//! | Variable           | Default                    |
//! |--------------------|----------------------------|
//! | `HOST`             | `0.0.0.0`                  |
//! | `PORT`             | `8000`                     |
//! | `SHUTDOWN_TIMEOUT` | `30` (seconds)             |
//! | `STORE_BACKEND`    | `memory`                   |
//! | `REDIS_URL`        | `redis://localhost:6379/1` |
//! | `REDIS_JOBS_URL`   | `redis://localhost:6379/0` |
//! | `JOB_WORKERS`      | `2`                        |
//! | `METRICS_ENABLED`  | `true`                     |

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value outside its allowed set
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Where list data and job records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local maps; data is lost on exit
    Memory,
    /// Redis databases at `REDIS_URL` and `REDIS_JOBS_URL`
    Redis,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigError::InvalidValue {
                name: "STORE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Redis => f.write_str("redis"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Store configuration
    pub store: StoreConfig,
    /// Job runner configuration
    pub jobs: JobsConfig,
    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend for both list data and job records
    pub backend: StoreBackend,
    /// Redis URL for list data
    pub data_url: String,
    /// Redis URL for job records (a separate database)
    pub jobs_url: String,
}

/// Job runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Number of worker tasks
    pub workers: usize,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `/metrics`
    pub enabled: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STORE_BACKEND` is unknown or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    ///
    /// Unparseable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STORE_BACKEND` is unknown or validation fails.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Memory,
        };

        let config = Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: lookup("PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8000),
                shutdown_timeout: lookup("SHUTDOWN_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            store: StoreConfig {
                backend,
                data_url: lookup("REDIS_URL")
                    .unwrap_or_else(|| "redis://localhost:6379/1".to_string()),
                jobs_url: lookup("REDIS_JOBS_URL")
                    .unwrap_or_else(|| "redis://localhost:6379/0".to_string()),
            },
            jobs: JobsConfig {
                workers: lookup("JOB_WORKERS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            },
            metrics: MetricsConfig {
                enabled: lookup("METRICS_ENABLED")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.workers == 0 {
            return Err(ConfigError::Validation("JOB_WORKERS must be > 0".to_string()));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Validation("HOST cannot be empty".to_string()));
        }
        if self.store.backend == StoreBackend::Redis && self.store.data_url == self.store.jobs_url {
            return Err(ConfigError::Validation(
                "REDIS_URL and REDIS_JOBS_URL must name different databases".to_string(),
            ));
        }
        Ok(())
    }

    /// Address to bind the HTTP listener to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Graceful shutdown timeout as Duration
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout)
    }
}
