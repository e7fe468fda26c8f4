//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DIGIVAULT_API_BASE_URL` - Base URL of the marketplace API
//! - `DIGIVAULT_API_TOKEN` - Bearer token for authenticated API calls
//!
//! ## Optional
//! - `DIGIVAULT_AUTHORIZE_TIMEOUT_SECS` - Payment authorization deadline
//!   (default: 30)
//! - `DIGIVAULT_SETTLE_DELAY_MS` - Settle delay of the simulated payment
//!   gateway (default: 2500)
//! - `DIGIVAULT_PRODUCT_CACHE_TTL_SECS` - Product snapshot cache TTL
//!   (default: 300)

use std::time::Duration;

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
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the marketplace API (session, catalog, cart).
    pub api_base_url: Url,
    /// Bearer token presented on every API call.
    pub api_token: SecretString,
    /// Deadline for a single payment authorization attempt.
    pub authorize_timeout: Duration,
    /// Settle delay of the simulated payment gateway.
    pub settle_delay: Duration,
    /// TTL for cached product snapshots.
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("api_token", &"[REDACTED]")
            .field("authorize_timeout", &self.authorize_timeout)
            .field("settle_delay", &self.settle_delay)
            .field("product_cache_ttl", &self.product_cache_ttl)
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
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_env(
            "DIGIVAULT_API_BASE_URL",
            &get_required_env("DIGIVAULT_API_BASE_URL")?,
        )?;
        let api_token = get_required_secret("DIGIVAULT_API_TOKEN")?;
        let authorize_timeout =
            Duration::from_secs(parse_env_or("DIGIVAULT_AUTHORIZE_TIMEOUT_SECS", 30)?);
        let settle_delay = Duration::from_millis(parse_env_or("DIGIVAULT_SETTLE_DELAY_MS", 2500)?);
        let product_cache_ttl =
            Duration::from_secs(parse_env_or("DIGIVAULT_PRODUCT_CACHE_TTL_SECS", 300)?);

        Ok(Self {
            api_base_url,
            api_token,
            authorize_timeout,
            settle_delay,
            product_cache_ttl,
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

/// Get a required environment variable as a secret, rejecting empty values.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be empty".to_string(),
        ));
    }
    Ok(SecretString::from(value))
}

/// Parse a value, attributing errors to the environment variable.
fn parse_env<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional environment variable with a default.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_env(key, &raw),
        Err(_) => Ok(default),
    }
}
