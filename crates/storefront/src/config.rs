//! Storefront configuration loaded from environment variables.
//!
//! Every variable is optional; defaults give a working local store with
//! the built-in demo catalog.
//!
//! # Environment Variables
//!
//! - `AFROVIBZ_HOST` - Bind address (default: 127.0.0.1)
//! - `AFROVIBZ_PORT` - Listen port (default: 3000)
//! - `AFROVIBZ_BASE_URL` - Public URL for the storefront (default: `http://localhost:3000`)
//! - `AFROVIBZ_CATALOG_PATH` - JSON catalog to load instead of the built-in seed
//! - `AFROVIBZ_CURRENCY` - ISO currency for display (default: USD)
//! - `AFROVIBZ_FREE_SHIPPING_THRESHOLD` - Subtotal for free standard delivery (default: 100.00)
//! - `AFROVIBZ_STANDARD_SHIPPING_FEE` - Standard delivery fee (default: 5.99)
//! - `AFROVIBZ_EXPRESS_SHIPPING_FEE` - Express delivery fee (default: 14.99)
//! - `AFROVIBZ_TAX_RATE` - Tax rate as a fraction, e.g. 0.125 (default: 0)
//! - `AFROVIBZ_TOKEN_TTL_SECS` - Login token lifetime (default: 86400)
//! - `AFROVIBZ_AUTH_RATE_LIMIT` - Rate limit `/api/auth` (default: true)
//! - `AFROVIBZ_ADMIN_PASSWORD` - Replaces the demo admin password; must be a strong secret
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use afrovibz_core::CurrencyCode;

const MIN_SECRET_LENGTH: usize = 12;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "admin",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
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
    /// Catalog file to load instead of the built-in seed
    pub catalog_path: Option<PathBuf>,
    /// Currency used for display and invoices
    pub currency: CurrencyCode,
    /// Delivery pricing
    pub shipping: ShippingConfig,
    /// Tax rate applied to the subtotal
    pub tax_rate: Decimal,
    /// Lifetime of issued login tokens
    pub token_ttl: Duration,
    /// Whether the auth endpoints are rate limited
    pub auth_rate_limit: bool,
    /// Replacement for the demo admin password
    pub admin_password: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Delivery fee configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingConfig {
    /// Standard delivery is free at or above this subtotal
    pub free_shipping_threshold: Decimal,
    /// Standard delivery fee below the threshold
    pub standard_fee: Decimal,
    /// Express delivery fee
    pub express_fee: Decimal,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::new(10000, 2),
            standard_fee: Decimal::new(599, 2),
            express_fee: Decimal::new(1499, 2),
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            catalog_path: None,
            currency: CurrencyCode::USD,
            shipping: ShippingConfig::default(),
            tax_rate: Decimal::ZERO,
            token_ttl: Duration::from_secs(86_400),
            auth_rate_limit: true,
            admin_password: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
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
    /// Returns `ConfigError` if a variable is malformed or the admin
    /// password fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let base_url = get_env_or_default("AFROVIBZ_BASE_URL", &defaults.base_url);
        validate_base_url(&base_url)?;

        let shipping = ShippingConfig {
            free_shipping_threshold: parse_env_or(
                "AFROVIBZ_FREE_SHIPPING_THRESHOLD",
                defaults.shipping.free_shipping_threshold,
            )?,
            standard_fee: parse_env_or(
                "AFROVIBZ_STANDARD_SHIPPING_FEE",
                defaults.shipping.standard_fee,
            )?,
            express_fee: parse_env_or("AFROVIBZ_EXPRESS_SHIPPING_FEE", defaults.shipping.express_fee)?,
        };
        for (key, fee) in [
            ("AFROVIBZ_FREE_SHIPPING_THRESHOLD", shipping.free_shipping_threshold),
            ("AFROVIBZ_STANDARD_SHIPPING_FEE", shipping.standard_fee),
            ("AFROVIBZ_EXPRESS_SHIPPING_FEE", shipping.express_fee),
        ] {
            if fee.is_sign_negative() {
                return Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    "must not be negative".to_string(),
                ));
            }
        }

        let tax_rate: Decimal = parse_env_or("AFROVIBZ_TAX_RATE", defaults.tax_rate)?;
        if tax_rate.is_sign_negative() || tax_rate >= Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "AFROVIBZ_TAX_RATE".to_string(),
                "must be a fraction between 0 and 1".to_string(),
            ));
        }

        let admin_password = get_optional_env("AFROVIBZ_ADMIN_PASSWORD")
            .map(|value| {
                validate_secret_strength(&value, "AFROVIBZ_ADMIN_PASSWORD")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;

        Ok(Self {
            host: parse_env_or("AFROVIBZ_HOST", defaults.host)?,
            port: parse_env_or("AFROVIBZ_PORT", defaults.port)?,
            base_url,
            catalog_path: get_optional_env("AFROVIBZ_CATALOG_PATH").map(PathBuf::from),
            currency: parse_env_or("AFROVIBZ_CURRENCY", defaults.currency)?,
            shipping,
            tax_rate,
            token_ttl: Duration::from_secs(parse_env_or(
                "AFROVIBZ_TOKEN_TTL_SECS",
                defaults.token_ttl.as_secs(),
            )?),
            auth_rate_limit: parse_env_or("AFROVIBZ_AUTH_RATE_LIMIT", defaults.auth_rate_limit)?,
            admin_password,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or("SENTRY_SAMPLE_RATE", defaults.sentry_sample_rate)?,
            sentry_traces_sample_rate: parse_env_or(
                "SENTRY_TRACES_SAMPLE_RATE",
                defaults.sentry_traces_sample_rate,
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// The base URL must be an absolute http(s) URL with a host.
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("AFROVIBZ_BASE_URL".to_string(), reason);
    let url = url::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("must have a host".to_string()));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has
/// sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.chars().count() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_SECRET_LENGTH} characters"),
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("changeme-Qx81!zz", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_too_short() {
        assert!(validate_secret_strength("aB3$xY9", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("abababababababab", "TEST_VAR").unwrap_err();
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://shop.afrovibz.com").is_ok());
        assert!(validate_base_url("ftp://shop.afrovibz.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_https());
        assert_eq!(config.shipping.free_shipping_threshold, Decimal::new(100, 0));
    }

    #[test]
    fn test_admin_password_debug_is_redacted() {
        let config = StorefrontConfig {
            admin_password: Some(SecretString::from("kQ9#vL2!xT7@pZ4$")),
            ..StorefrontConfig::default()
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("kQ9#vL2!xT7@pZ4$"));
    }
}
