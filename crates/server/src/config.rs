//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `EZ_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`,
//!   default: `sqlite://ezelectronics.db?mode=rwc`)
//! - `EZ_HOST` - Bind address (default: 127.0.0.1)
//! - `EZ_PORT` - Listen port (default: 3001)
//! - `EZ_BASE_URL` - Public URL of the API (default: <http://localhost:3001>)
//! - `EZ_CORS_ORIGIN` - Origin allowed to call the API with credentials
//!   (default: <http://localhost:5173>)
//! - `EZ_SESSION_TTL_HOURS` - Session inactivity expiry in hours (default: 24)
//! - `EZ_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://ezelectronics.db?mode=rwc";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API
    pub base_url: String,
    /// Origin allowed by CORS
    pub cors_origin: String,
    /// Session inactivity expiry, in hours
    pub session_ttl_hours: i64,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Error event sample rate
    pub sentry_sample_rate: f32,
    /// Transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("EZ_DATABASE_URL");
        let host = parse_env("EZ_HOST", "127.0.0.1")?;
        let port = parse_env("EZ_PORT", "3001")?;
        let base_url = get_env_or_default("EZ_BASE_URL", "http://localhost:3001");
        let cors_origin = get_env_or_default("EZ_CORS_ORIGIN", "http://localhost:5173");
        let session_ttl_hours: i64 = parse_env("EZ_SESSION_TTL_HOURS", "24")?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "EZ_SESSION_TTL_HOURS".to_string(),
                "must be positive".to_string(),
            ));
        }
        let log_format = parse_env("EZ_LOG_FORMAT", "pretty")?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_sample_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_sample_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors_origin,
            session_ttl_hours,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for tests: in-memory database, plain HTTP, no Sentry.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            database_url: SecretString::from("sqlite::memory:"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost:3001".to_string(),
            cors_origin: "http://localhost:5173".to_string(),
            session_ttl_hours: 24,
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Session cookies are marked `Secure` when served over HTTPS.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> SecretString {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_or_else(
            |_| SecretString::from(DEFAULT_DATABASE_URL),
            SecretString::from,
        )
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a sample rate and check it lies in `0.0..=1.0`.
fn parse_sample_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, default)?;
    check_sample_rate(key, rate)
}

fn check_sample_rate(key: &str, rate: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_parse_value_port() {
        let port: u16 = parse_value("EZ_PORT", "8080").unwrap();
        assert_eq!(port, 8080);

        let err = parse_value::<u16>("EZ_PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "EZ_PORT"));
    }

    #[test]
    fn test_parse_value_host() {
        let host: IpAddr = parse_value("EZ_HOST", " 0.0.0.0 ").unwrap();
        assert_eq!(host.to_string(), "0.0.0.0");
        assert!(parse_value::<IpAddr>("EZ_HOST", "localhost").is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("PRETTY".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_check_sample_rate_bounds() {
        assert!(check_sample_rate("SENTRY_SAMPLE_RATE", 0.0).is_ok());
        assert!(check_sample_rate("SENTRY_SAMPLE_RATE", 1.0).is_ok());
        assert!(check_sample_rate("SENTRY_SAMPLE_RATE", 1.5).is_err());
        assert!(check_sample_rate("SENTRY_SAMPLE_RATE", -0.1).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let mut config = ServerConfig::for_testing();
        config.port = 3001;

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_secure_cookies_follow_scheme() {
        let mut config = ServerConfig::for_testing();
        assert!(!config.secure_cookies());

        config.base_url = "https://shop.example.com".to_string();
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let mut config = ServerConfig::for_testing();
        config.database_url = SecretString::from("sqlite:///var/lib/ez/secret-path.db");

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret-path"));
        assert_eq!(
            config.database_url.expose_secret(),
            "sqlite:///var/lib/ez/secret-path.db"
        );
    }
}
