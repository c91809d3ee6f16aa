//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FAKESTORE_API_URL` - Catalog API base URL (default: <https://api.escuelajs.co/api/v1>)
//! - `FAKESTORE_DATA_DIR` - Local storage directory (default: `.fakestore`)
//! - `FAKESTORE_CART_KEY` - Local storage key holding the cart (default: `cart`)
//! - `FAKESTORE_CACHE_TTL_SECS` - Catalog cache time-to-live (default: 300)
//! - `FAKESTORE_REQUEST_TIMEOUT_SECS` - Catalog request timeout (default: 15)
//! - `FAKESTORE_PAGE_SIZE` - Product listing page size (default: 12)
//! - `FAKESTORE_ADMIN_EMAIL` - Admin login email for product management
//! - `FAKESTORE_ADMIN_PASSWORD` - Admin login password
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.escuelajs.co/api/v1";
const DEFAULT_DATA_DIR: &str = ".fakestore";
const DEFAULT_CART_KEY: &str = "cart";

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
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Directory backing the local key-value store
    pub data_dir: PathBuf,
    /// Key the cart is stored under
    pub cart_key: String,
    /// Product listing page size
    pub page_size: u32,
    /// Admin credentials for product management
    pub admin: Option<AdminCredentials>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the REST API
    pub api_url: Url,
    /// How long product and category responses stay cached
    pub cache_ttl: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Admin login credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminCredentials {
    /// Login email
    pub email: String,
    /// Login password
    pub password: SecretString,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid, or if only one
    /// of the admin email/password pair is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let catalog = CatalogConfig::from_env()?;
        let data_dir = PathBuf::from(get_env_or_default("FAKESTORE_DATA_DIR", DEFAULT_DATA_DIR));
        let cart_key = get_env_or_default("FAKESTORE_CART_KEY", DEFAULT_CART_KEY);
        let page_size = parse_env("FAKESTORE_PAGE_SIZE", 12_u32)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "FAKESTORE_PAGE_SIZE".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        let admin = AdminCredentials::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            catalog,
            data_dir,
            cart_key,
            page_size,
            admin,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Configuration for a given data directory with every other value at
    /// its default.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog: CatalogConfig::default(),
            data_dir: data_dir.into(),
            cart_key: DEFAULT_CART_KEY.to_string(),
            page_size: 12,
            admin: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_api_url(&get_env_or_default("FAKESTORE_API_URL", DEFAULT_API_URL))?;
        let cache_ttl = Duration::from_secs(parse_env("FAKESTORE_CACHE_TTL_SECS", 300_u64)?);
        let request_timeout =
            Duration::from_secs(parse_env("FAKESTORE_REQUEST_TIMEOUT_SECS", 15_u64)?);

        Ok(Self {
            api_url,
            cache_ttl,
            request_timeout,
        })
    }
}

impl AdminCredentials {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (
            get_optional_env("FAKESTORE_ADMIN_EMAIL"),
            get_optional_env("FAKESTORE_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Ok(Some(Self {
                email,
                password: SecretString::from(password),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "FAKESTORE_ADMIN_PASSWORD".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(
                "FAKESTORE_ADMIN_EMAIL".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and check a catalog API base URL.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value is not an http(s) URL.
pub fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        ConfigError::InvalidEnvVar("FAKESTORE_API_URL".to_string(), e.to_string())
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "FAKESTORE_API_URL".to_string(),
            format!("must be an http(s) URL (got {value})"),
        ));
    }

    Ok(url)
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
