//! Database configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `INVOICING_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `INVOICING_DB_MAX_CONNECTIONS` - Pool size ceiling (default: 10)
//! - `INVOICING_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 2)
//! - `INVOICING_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a connection (default: 10)

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Connection pool configuration.
///
/// Implements `Debug` manually to redact the connection string.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl DatabaseConfig {
    /// Configuration with default pool settings for the given URL.
    #[must_use]
    pub fn new(database_url: SecretString) -> Self {
        Self {
            database_url,
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(10),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is missing or a pool setting does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("INVOICING_DATABASE_URL")?;
        let max_connections = parse_env_or_default("INVOICING_DB_MAX_CONNECTIONS", 10)?;
        let min_connections = parse_env_or_default("INVOICING_DB_MIN_CONNECTIONS", 2)?;
        let acquire_timeout_secs = parse_env_or_default("INVOICING_DB_ACQUIRE_TIMEOUT_SECS", 10)?;

        if min_connections > max_connections {
            return Err(ConfigError::InvalidEnvVar(
                "INVOICING_DB_MIN_CONNECTIONS".to_string(),
                format!("must not exceed INVOICING_DB_MAX_CONNECTIONS ({max_connections})"),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            min_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }

    /// The connection string, for handing to the driver.
    #[must_use]
    pub fn expose_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Parse an environment variable, using `default` when it is unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
