//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `BAZAAR_API_URL` - Base URL of the remote commerce API (e.g. `https://api.example.com/api/`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BAZAAR_MEDIA_URL` - Base for product image paths (default: origin of the API URL)
//! - `BAZAAR_API_TIMEOUT_SECS` - Outbound request timeout (default: 15)
//! - `STOREFRONT_CURRENCY_SYMBOL` - Price prefix (default: ₹)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

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
    /// Remote commerce API configuration
    pub api: ApiConfig,
    /// Prefix for rendered prices
    pub currency_symbol: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Remote commerce API configuration.
///
/// Shared with the command-line client, which builds it from its own flags.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL, always ending in `/`
    pub base_url: Url,
    /// Base that relative image paths resolve against, always ending in `/`
    pub media_url: Url,
    /// Timeout for each outbound request
    pub timeout: Duration,
}

impl ApiConfig {
    /// API configuration with the default media base and timeout.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        let base_url = with_trailing_slash(base_url);
        let media_url = origin_of(&base_url);
        Self {
            base_url,
            media_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the media base.
    #[must_use]
    pub fn with_media_url(mut self, media_url: Url) -> Self {
        self.media_url = with_trailing_slash(media_url);
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_required_url(lookup, "BAZAAR_API_URL")?;
        let mut api = Self::new(base_url);

        if let Some(media) = get_optional_url(lookup, "BAZAAR_MEDIA_URL")? {
            api = api.with_media_url(media);
        }

        let timeout_secs = get_env_or_default(
            lookup,
            "BAZAAR_API_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_API_TIMEOUT_SECS".to_string(), e.to_string()))?;

        Ok(api.with_timeout(Duration::from_secs(timeout_secs)))
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

        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get_env_or_default(lookup, "STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default(lookup, "STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_url(lookup, "STOREFRONT_BASE_URL")?
            .as_str()
            .trim_end_matches('/')
            .to_string();

        let api = ApiConfig::from_lookup(lookup)?;
        let currency_symbol = get_env_or_default(lookup, "STOREFRONT_CURRENCY_SYMBOL", "₹");

        let sentry_sample_rate = get_env_or_default(lookup, "SENTRY_SAMPLE_RATE", "1.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), e.to_string())
            })?;
        let sentry_traces_sample_rate =
            get_env_or_default(lookup, "SENTRY_TRACES_SAMPLE_RATE", "0.0")
                .parse::<f32>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "SENTRY_TRACES_SAMPLE_RATE".to_string(),
                        e.to_string(),
                    )
                })?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            currency_symbol,
            sentry_dsn: get_optional_env(lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(lookup, "SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    get_optional_env(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a required environment variable as an absolute http(s) URL.
fn get_required_url(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Url, ConfigError> {
    parse_http_url(key, &get_required_env(lookup, key)?)
}

fn get_optional_url(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Url>, ConfigError> {
    get_optional_env(lookup, key)
        .map(|value| parse_http_url(key, &value))
        .transpose()
}

fn parse_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Relative joins drop the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(&|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("STOREFRONT_BASE_URL", "http://localhost:3000/"),
        ("BAZAAR_API_URL", "https://shop.example.com/api"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.api.base_url.as_str(), "https://shop.example.com/api/");
        assert_eq!(config.api.media_url.as_str(), "https://shop.example.com/");
        assert_eq!(config.api.timeout, Duration::from_secs(15));
        assert_eq!(config.currency_symbol, "₹");
        assert!(config.sentry_dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("STOREFRONT_BASE_URL", "http://localhost:3000")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "BAZAAR_API_URL"));
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let err = load(&[
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("BAZAAR_API_URL", "   "),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars[1] = ("BAZAAR_API_URL", "not a url");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(ref k, _) if k == "BAZAAR_API_URL"
        ));

        vars[1] = ("BAZAAR_API_URL", "ftp://shop.example.com/");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(_, _)
        ));
    }

    #[test]
    fn test_invalid_port_and_timeout() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("STOREFRONT_PORT", "eighty"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_PORT"
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("BAZAAR_API_TIMEOUT_SECS", "-1"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(ref k, _) if k == "BAZAAR_API_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("STOREFRONT_BASE_URL", "https://shop.example.com"),
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("BAZAAR_MEDIA_URL", "https://cdn.example.com/assets"),
            ("BAZAAR_API_TIMEOUT_SECS", "3"),
            ("STOREFRONT_CURRENCY_SYMBOL", "$"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.api.media_url.as_str(), "https://cdn.example.com/assets/");
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.currency_symbol, "$");
        assert!(config.is_secure());
    }
}
