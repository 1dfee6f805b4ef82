//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PORTAL_API_URL` - Base URL of the REST API (e.g., `http://localhost:8080/api`)
//!
//! ## Optional
//! - `PORTAL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTAL_PORT` - Listen port (default: 4200)
//! - `PORTAL_BASE_URL` - Public URL of the site (default: `http://{host}:{port}`)
//! - `PORTAL_SESSION_DATABASE_URL` - `SQLite` URL for the session store
//!   (default: `sqlite://portal-sessions.db?mode=rwc`)
//! - `PORTAL_STATIC_DIR` - Directory served under `/static` (default: `crates/web/static`)
//! - `PORTAL_API_TIMEOUT_SECS` - Per-request timeout for API calls (default: 10)
//! - `PORTAL_AUTH_RATE_PER_SECOND` - Seconds to replenish one auth request (default: 6)
//! - `PORTAL_AUTH_RATE_BURST` - Auth request burst size (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_DATABASE_URL: &str = "sqlite://portal-sessions.db?mode=rwc";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Session store connection URL
    pub session_database_url: SecretString,
    /// Directory with CSS and other static assets
    pub static_dir: PathBuf,
    /// REST API client configuration
    pub api: ApiConfig,
    /// Auth endpoint rate limiting
    pub rate_limit: RateLimitConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// REST API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Rate limiting for the login and registration endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Seconds needed to replenish one request.
    pub per_second: u64,
    /// Requests allowed in a burst.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 6,
            burst_size: 5,
        }
    }
}

impl PortalConfig {
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

        let host: IpAddr = parse_env_or_default("PORTAL_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default("PORTAL_PORT", "4200")?;
        let base_url = get_optional_env("PORTAL_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));
        let session_database_url = SecretString::from(get_env_or_default(
            "PORTAL_SESSION_DATABASE_URL",
            DEFAULT_SESSION_DATABASE_URL,
        ));
        let static_dir = PathBuf::from(get_env_or_default("PORTAL_STATIC_DIR", "crates/web/static"));

        let api = ApiConfig::from_env()?;
        let rate_limit = RateLimitConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            session_database_url,
            static_dir,
            api,
            rate_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls the `Secure` cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ApiConfig {
    /// Build an API configuration from a base URL string.
    ///
    /// A trailing slash is added when missing so that relative endpoint
    /// paths are appended rather than replacing the last path segment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed or is
    /// not http(s).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEnvVar("PORTAL_API_URL".to_string(), reason);

        let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            timeout,
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("PORTAL_API_URL")?;
        let timeout_secs: u64 = parse_env_or_default("PORTAL_API_TIMEOUT_SECS", "10")?;
        Self::new(&base_url, Duration::from_secs(timeout_secs))
    }
}

impl RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let per_second =
            parse_env_or_default("PORTAL_AUTH_RATE_PER_SECOND", &defaults.per_second.to_string())?;
        let burst_size =
            parse_env_or_default("PORTAL_AUTH_RATE_BURST", &defaults.burst_size.to_string())?;

        if per_second == 0 || burst_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PORTAL_AUTH_RATE_*".to_string(),
                "rate limit values must be positive".to_string(),
            ));
        }

        Ok(Self {
            per_second,
            burst_size,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
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
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
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
