//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Every variable is optional; an empty value
//! counts as unset and falls back to the default.

use sqlx::postgres::PgConnectOptions;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which repository implementation backs the services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("'{}' is not one of postgres, memory", other)),
        }
    }
}

/// Connection settings for PostgreSQL.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

/// HTTP listener settings. Timeouts are whole seconds in the environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub http_port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.http_port))
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub storage: StorageBackend,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: "password".to_string(),
                name: "questions_db".to_string(),
            },
            server: ServerConfig {
                http_port: 8080,
                read_timeout: Duration::from_secs(15),
                write_timeout: Duration::from_secs(15),
                idle_timeout: Duration::from_secs(60),
                shutdown_timeout: Duration::from_secs(30),
                request_timeout: Duration::from_secs(5),
            },
            storage: StorageBackend::Postgres,
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // --- Database Settings ---
        let database = DatabaseConfig {
            host: get("DB_HOST").unwrap_or(defaults.database.host),
            port: parse_or(&get, "DB_PORT", defaults.database.port)?,
            user: get("DB_USER").unwrap_or(defaults.database.user),
            password: get("DB_PASSWORD").unwrap_or(defaults.database.password),
            name: get("DB_NAME").unwrap_or(defaults.database.name),
        };

        // --- Server Settings ---
        let server = ServerConfig {
            http_port: parse_or(&get, "HTTP_PORT", defaults.server.http_port)?,
            read_timeout: seconds_or(&get, "HTTP_READ_TIMEOUT", defaults.server.read_timeout)?,
            write_timeout: seconds_or(&get, "HTTP_WRITE_TIMEOUT", defaults.server.write_timeout)?,
            idle_timeout: seconds_or(&get, "HTTP_IDLE_TIMEOUT", defaults.server.idle_timeout)?,
            shutdown_timeout: seconds_or(
                &get,
                "HTTP_SHUTDOWN_TIMEOUT",
                defaults.server.shutdown_timeout,
            )?,
            request_timeout: seconds_or(
                &get,
                "HTTP_REQUEST_TIMEOUT",
                defaults.server.request_timeout,
            )?,
        };

        // The request deadline must expire before the write timeout answers a bare 408.
        if server.request_timeout >= server.write_timeout {
            return Err(ConfigError::InvalidValue(
                "HTTP_REQUEST_TIMEOUT".to_string(),
                format!(
                    "{}s must be shorter than HTTP_WRITE_TIMEOUT ({}s)",
                    server.request_timeout.as_secs(),
                    server.write_timeout.as_secs()
                ),
            ));
        }

        let storage = match get("STORAGE_BACKEND") {
            Some(raw) => raw
                .parse::<StorageBackend>()
                .map_err(|e| ConfigError::InvalidValue("STORAGE_BACKEND".to_string(), e))?,
            None => defaults.storage,
        };

        let log_level = match get("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        Ok(Self {
            database,
            server,
            storage,
            log_level,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

fn seconds_or<G>(get: &G, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    parse_or(get, key, default.as_secs()).map(Duration::from_secs)
}
