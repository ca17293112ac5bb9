//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CRIB_MERCHANT_WHATSAPP` - Merchant WhatsApp number, digits only (default: 2349078048405)
//! - `CRIB_COUNTRY_CODE` - Calling code replacing a leading `0` (default: 234)
//! - `CRIB_BRAND` - Brand name used in messages (default: CRIB)
//! - `CRIB_CHANNEL_BASE_URL` - Messaging channel base URL (default: <https://wa.me>)
//! - `CRIB_CLEAR_DELAY_MS` - Delay before clearing the cart after checkout (default: 2000)
//! - `CRIB_STORAGE_DIR` - Directory holding the saved cart (default: .crib)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::checkout::{
    DEFAULT_BRAND, DEFAULT_CHANNEL_BASE_URL, DEFAULT_COUNTRY_CODE, DEFAULT_MERCHANT_ADDRESS,
    HandoffConfig,
};

/// Default directory for the saved cart.
pub const DEFAULT_STORAGE_DIR: &str = ".crib";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Merchant WhatsApp number (international, digits only)
    pub merchant_address: String,
    /// Calling code replacing a local trunk prefix
    pub country_code: String,
    /// Brand name used in messages and notices
    pub brand: String,
    /// Messaging channel base URL
    pub channel_base_url: Url,
    /// Delay between a completed checkout and the cart clear
    pub clear_delay: Duration,
    /// Directory holding the saved cart
    pub storage_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        let handoff = HandoffConfig::default();
        Self {
            merchant_address: handoff.merchant_address,
            country_code: handoff.country_code,
            brand: handoff.brand,
            channel_base_url: handoff.channel_base,
            clear_delay: handoff.clear_delay,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            sentry_dsn: None,
            sentry_environment: None,
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
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let merchant_address =
            get_digits(&lookup, "CRIB_MERCHANT_WHATSAPP", DEFAULT_MERCHANT_ADDRESS)?;
        let country_code = get_digits(&lookup, "CRIB_COUNTRY_CODE", DEFAULT_COUNTRY_CODE)?;

        let brand = get_env_or_default(&lookup, "CRIB_BRAND", DEFAULT_BRAND);

        let channel_base =
            get_env_or_default(&lookup, "CRIB_CHANNEL_BASE_URL", DEFAULT_CHANNEL_BASE_URL);
        let channel_base_url = Url::parse(&channel_base).map_err(|e| {
            ConfigError::InvalidEnvVar("CRIB_CHANNEL_BASE_URL".to_string(), e.to_string())
        })?;
        if channel_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "CRIB_CHANNEL_BASE_URL".to_string(),
                "must be a hierarchical URL".to_string(),
            ));
        }

        let clear_delay_ms = get_env_or_default(&lookup, "CRIB_CLEAR_DELAY_MS", "2000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CRIB_CLEAR_DELAY_MS".to_string(), e.to_string())
            })?;

        let storage_dir = get_env_or_default(&lookup, "CRIB_STORAGE_DIR", DEFAULT_STORAGE_DIR);

        Ok(Self {
            merchant_address,
            country_code,
            brand: brand.trim().to_string(),
            channel_base_url,
            clear_delay: Duration::from_millis(clear_delay_ms),
            storage_dir: PathBuf::from(storage_dir),
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Settings for the checkout handoff.
    #[must_use]
    pub fn handoff(&self) -> HandoffConfig {
        HandoffConfig {
            merchant_address: self.merchant_address.clone(),
            country_code: self.country_code.clone(),
            brand: self.brand.clone(),
            channel_base: self.channel_base_url.clone(),
            clear_delay: self.clear_delay,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional, non-empty variable.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key)
        .unwrap_or_else(|| default.to_owned())
}

/// Get a variable that must consist of ASCII digits only.
fn get_digits(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    let value = get_env_or_default(lookup, key, default).trim().to_string();
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must contain digits only".to_string(),
        ));
    }
    Ok(value)
}
