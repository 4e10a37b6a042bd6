//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_URL` - Base URL of the backend product/cart API
//!
//! ## Optional
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_API_TOKEN` - Fallback bearer token for cart calls
//! - `STOREFRONT_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `STOREFRONT_CATALOG_CACHE_SECS` - Catalog cache TTL (default: 300)
//! - `STOREFRONT_SLIDER_BREAKPOINT` - Mobile/tablet slider breakpoint in px (default: 992)
//! - `STOREFRONT_TAX_RATE` - Cart tax rate as a decimal fraction (default: 0.10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Backend API configuration
    pub api: BackendApiConfig,
    /// Presentation settings
    pub display: DisplayConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced by Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Backend product/cart API configuration.
///
/// Implements `Debug` manually to redact the service token.
#[derive(Clone)]
pub struct BackendApiConfig {
    /// Base URL of the backend (e.g., <https://api.dinemart.example>)
    pub base_url: Url,
    /// Bearer token used for cart calls when the shopper has no `access_token` cookie
    pub service_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for BackendApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "service_token",
                &self.service_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

/// Presentation settings for views.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Viewports at or below this width (px) get the single-slide slider
    pub slider_breakpoint: u32,
    /// Tax rate applied to the cart subtotal
    pub tax_rate: Decimal,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            slider_breakpoint: 992,
            tax_rate: Decimal::new(10, 2),
        }
    }
}

impl StorefrontConfig {
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

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");

        let api = BackendApiConfig::from_env()?;
        let display = DisplayConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            display,
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

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("STOREFRONT_API_URL")?;
        let base_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e))?;

        let timeout_secs = parse_env_or_default::<u64>("STOREFRONT_API_TIMEOUT_SECS", "10")?;
        let cache_secs = parse_env_or_default::<u64>("STOREFRONT_CATALOG_CACHE_SECS", "300")?;

        Ok(Self {
            base_url,
            service_token: get_optional_env("STOREFRONT_API_TOKEN").map(SecretString::from),
            timeout: Duration::from_secs(timeout_secs),
            catalog_cache_ttl: Duration::from_secs(cache_secs),
        })
    }
}

impl DisplayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let slider_breakpoint = parse_env_or_default::<u32>("STOREFRONT_SLIDER_BREAKPOINT", "992")?;
        let tax_rate = parse_env_or_default::<Decimal>("STOREFRONT_TAX_RATE", "0.10")?;

        if tax_rate.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_TAX_RATE".to_string(),
                "must not be negative".to_string(),
            ));
        }

        Ok(Self {
            slider_breakpoint,
            tax_rate,
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
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default literal.
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

/// Parse the backend base URL, ensuring a trailing slash so `Url::join`
/// keeps any path prefix (e.g. `https://host/backend/`).
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            api: BackendApiConfig {
                base_url: Url::parse("http://localhost:8000/").unwrap(),
                service_token: Some(SecretString::from("super_secret_service_token")),
                timeout: Duration::from_secs(10),
                catalog_cache_ttl: Duration::from_secs(300),
            },
            display: DisplayConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        let mut config = test_config();
        assert!(!config.is_secure());
        config.base_url = "https://shop.dinemart.example".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let debug_output = format!("{:?}", test_config().api);

        assert!(debug_output.contains("localhost:8000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_token"));
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("https://api.example.com/backend").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/backend/");
        assert_eq!(
            url.join("api/getproducts").unwrap().as_str(),
            "https://api.example.com/backend/api/getproducts"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://api.example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("STOREFRONT_PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));

        let rate = parse_value::<Decimal>("STOREFRONT_TAX_RATE", " 0.08 ").unwrap();
        assert_eq!(rate, Decimal::new(8, 2));
    }

    #[test]
    fn test_display_defaults() {
        let display = DisplayConfig::default();
        assert_eq!(display.slider_breakpoint, 992);
        assert_eq!(display.tax_rate, Decimal::new(10, 2));
    }
}
