//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `THREAD_HAVEN_ORDER_API_URL` - Base URL of the external order API
//!
//! ## Optional
//! - `THREAD_HAVEN_STORAGE_DIR` - Profile directory for persisted cart &
//!   checkout state (default: `.thread-haven`)
//! - `THREAD_HAVEN_SHIPPING_LOCAL_FEE` - Local-tier delivery fee (default: 60)
//! - `THREAD_HAVEN_SHIPPING_REMOTE_FEE` - Remote-tier delivery fee (default: 120)

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use crate::checkout::ShippingRegion;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Fixed delivery fees per region tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingConfig {
    /// Fee inside the local delivery zone.
    pub local_fee: Decimal,
    /// Fee everywhere else.
    pub remote_fee: Decimal,
}

impl ShippingConfig {
    /// The fee for a region tier.
    #[must_use]
    pub const fn fee(&self, region: ShippingRegion) -> Decimal {
        match region {
            ShippingRegion::Local => self.local_fee,
            ShippingRegion::Remote => self.remote_fee,
        }
    }
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            local_fee: Decimal::from(60),
            remote_fee: Decimal::from(120),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Profile directory holding persisted cart & checkout state.
    pub storage_dir: PathBuf,
    /// Base URL of the external order API.
    pub order_api_url: Url,
    /// Delivery fee tiers.
    pub shipping: ShippingConfig,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let order_api_url = get_env("THREAD_HAVEN_ORDER_API_URL")?;
        let order_api_url = Url::parse(&order_api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("THREAD_HAVEN_ORDER_API_URL".to_owned(), e.to_string())
        })?;

        let storage_dir =
            PathBuf::from(get_env_or_default("THREAD_HAVEN_STORAGE_DIR", ".thread-haven"));

        let shipping = ShippingConfig {
            local_fee: get_fee("THREAD_HAVEN_SHIPPING_LOCAL_FEE", "60")?,
            remote_fee: get_fee("THREAD_HAVEN_SHIPPING_REMOTE_FEE", "120")?,
        };

        Ok(Self {
            storage_dir,
            order_api_url,
            shipping,
        })
    }
}

fn get_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn get_fee(name: &str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = get_env_or_default(name, default);
    let fee = Decimal::from_str(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_owned(), e.to_string()))?;
    if fee.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            name.to_owned(),
            "fee cannot be negative".to_owned(),
        ));
    }
    Ok(fee)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fees() {
        let shipping = ShippingConfig::default();
        assert_eq!(shipping.fee(ShippingRegion::Local), Decimal::from(60));
        assert_eq!(shipping.fee(ShippingRegion::Remote), Decimal::from(120));
    }

    #[test]
    fn test_fee_parsing_rejects_negative() {
        // Defaults are used when the variable is unset, so exercise the
        // parser directly with a name that is never set.
        assert!(get_fee("THREAD_HAVEN_TEST_UNSET_FEE", "-5").is_err());
        assert_eq!(
            get_fee("THREAD_HAVEN_TEST_UNSET_FEE", "75.50").unwrap(),
            Decimal::from_str("75.50").unwrap()
        );
    }
}
