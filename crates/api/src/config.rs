//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MULTIVERSE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`). Only required with the `postgres` storage backend.
//!
//! ## Optional
//! - `MULTIVERSE_STORAGE` - `postgres` (default) or `memory`
//! - `MULTIVERSE_HOST` - Bind address (default: 127.0.0.1)
//! - `MULTIVERSE_PORT` - Listen port (default: 3000)
//! - `MULTIVERSE_CORS_ORIGIN` - Origin allowed to call the API (default: any)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the catalog lives.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// `PostgreSQL` database (connection URL contains the password).
    Postgres { database_url: SecretString },
    /// In-process store seeded with the demo catalog.
    Memory,
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub storage: StorageConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origin allowed by CORS; any origin when unset
    pub cors_origin: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let storage = match env.or_default("MULTIVERSE_STORAGE", "postgres").as_str() {
            "postgres" => StorageConfig::Postgres {
                database_url: env.database_url("MULTIVERSE_DATABASE_URL")?,
            },
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "MULTIVERSE_STORAGE".to_string(),
                    format!("expected `postgres` or `memory`, got `{other}`"),
                ));
            }
        };

        Ok(Self {
            storage,
            host: env.parse_or("MULTIVERSE_HOST", "127.0.0.1")?,
            port: env.parse_or("MULTIVERSE_PORT", "3000")?,
            cors_origin: env.optional("MULTIVERSE_CORS_ORIGIN"),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_memory_storage() {
        let config = load(&[("MULTIVERSE_STORAGE", "memory")]).unwrap();
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(config.cors_origin.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(config.sentry_traces_sample_rate.abs() < f32::EPSILON);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "MULTIVERSE_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/multiverse")]).unwrap();
        let StorageConfig::Postgres { database_url } = config.storage else {
            panic!("expected postgres storage");
        };
        assert_eq!(database_url.expose_secret(), "postgres://localhost/multiverse");
    }

    #[test]
    fn test_primary_database_url_wins() {
        let config = load(&[
            ("DATABASE_URL", "postgres://fallback"),
            ("MULTIVERSE_DATABASE_URL", "postgres://primary"),
        ])
        .unwrap();
        let StorageConfig::Postgres { database_url } = config.storage else {
            panic!("expected postgres storage");
        };
        assert_eq!(database_url.expose_secret(), "postgres://primary");
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("MULTIVERSE_STORAGE", "sqlite")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "MULTIVERSE_STORAGE"));

        let err = load(&[("MULTIVERSE_STORAGE", "memory"), ("MULTIVERSE_PORT", "http")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "MULTIVERSE_PORT"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MULTIVERSE_STORAGE", "memory"),
            ("MULTIVERSE_HOST", "0.0.0.0"),
            ("MULTIVERSE_PORT", "8080"),
            ("MULTIVERSE_CORS_ORIGIN", "http://localhost:5173"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:5173"));
        assert!((config.sentry_traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }
}
