//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE_URL` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ADMIN_API_KEY` - Admin API access token (`shpat_...`)
//!
//! ## Optional
//! - `NCV_HOST` - Bind address (default: 127.0.0.1)
//! - `NCV_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2023-10)
//! - `SHOPIFY_GRAPHQL_ENDPOINT` - Full endpoint URL, overrides store + version
//! - `SHOPIFY_MAX_ATTEMPTS` - Attempts per request before giving up (default: 5)
//! - `SHOPIFY_BACKOFF_INITIAL_MS` - First retry delay (default: 1000)
//! - `SHOPIFY_BACKOFF_MAX_SECS` - Retry delay ceiling (default: 30)
//! - `CATALOG_CACHE_TTL_SECS` - Vendor/product cache lifetime (default: 600)
//! - `CATALOG_PAGE_SIZE` - Products per upstream page, 1-250 (default: 250)
//! - `CATALOG_SWEEP_DEADLINE_SECS` - Wall-clock ceiling per sweep (default: 30)
//! - `CATALOG_VENDOR_CATEGORY` - Product type that qualifies a vendor (default: DISPOSABLES)
//! - `CATALOG_CAPACITY_METAFIELD` - `namespace.key` of the capacity metafield (default: custom.capacity)
//! - `CATALOG_BATTERY_METAFIELD` - `namespace.key` of the battery metafield (default: custom.battery_capacity)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::shopify::MAX_PRODUCT_PAGE_SIZE;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const DEFAULT_API_VERSION: &str = "2023-10";
const MAX_VENDOR_PAGE_SIZE: u32 = 250;
const DEFAULT_PRODUCT_PAGE_SIZE: u32 = 50;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration
    pub shopify: ShopifyAdminConfig,
    /// Catalog ingestion and caching configuration
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2023-10)
    pub api_version: String,
    /// Admin API access token
    pub access_token: SecretString,
    /// Explicit GraphQL endpoint (takes precedence over store + version)
    pub endpoint_override: Option<Url>,
    /// Attempts per request, including the first
    pub max_attempts: u32,
    /// Delay before the first retry when no `Retry-After` is given
    pub backoff_initial: Duration,
    /// Ceiling for any single retry delay
    pub backoff_max: Duration,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("endpoint_override", &self.endpoint_override)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_initial", &self.backoff_initial)
            .field("backoff_max", &self.backoff_max)
            .finish()
    }
}

impl ShopifyAdminConfig {
    /// Create a configuration with default retry settings.
    #[must_use]
    pub fn new(store: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            store: normalize_store_domain(&store.into()),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token,
            endpoint_override: None,
            max_attempts: 5,
            backoff_initial: Duration::from_secs(1),
            backoff_max: Duration::from_secs(30),
        }
    }

    /// The Admin GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint_override.as_ref().map_or_else(
            || {
                format!(
                    "https://{}/admin/api/{}/graphql.json",
                    self.store, self.api_version
                )
            },
            ToString::to_string,
        )
    }
}

/// A metafield reference (`namespace.key`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetafieldRef {
    pub namespace: String,
    pub key: String,
}

impl MetafieldRef {
    #[must_use]
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Parse `namespace.key`. The key is everything after the first dot.
    fn parse(var: &str, raw: &str) -> Result<Self, ConfigError> {
        match raw.split_once('.') {
            Some((ns, key)) if !ns.is_empty() && !key.is_empty() => Ok(Self::new(ns, key)),
            _ => Err(ConfigError::InvalidEnvVar(
                var.to_string(),
                format!("expected namespace.key, got '{raw}'"),
            )),
        }
    }
}

/// Catalog ingestion and caching configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Lifetime of cached vendor and product lists
    pub cache_ttl: Duration,
    /// Listings requested per vendor sweep page
    pub vendor_page_size: u32,
    /// Products requested per product sweep page, bounded by query cost
    pub product_page_size: u32,
    /// Wall-clock ceiling for a single sweep
    pub sweep_deadline: Duration,
    /// Product type a vendor needs at least one product of
    pub vendor_category: String,
    /// Capacity metafield lookup
    pub capacity_metafield: MetafieldRef,
    /// Battery capacity metafield lookup
    pub battery_metafield: MetafieldRef,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(600),
            vendor_page_size: MAX_VENDOR_PAGE_SIZE,
            product_page_size: DEFAULT_PRODUCT_PAGE_SIZE,
            sweep_deadline: Duration::from_secs(30),
            vendor_category: "DISPOSABLES".to_string(),
            capacity_metafield: MetafieldRef::new("custom", "capacity"),
            battery_metafield: MetafieldRef::new("custom", "battery_capacity"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the access token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parsed("NCV_HOST", "127.0.0.1".parse::<IpAddr>().ok())?;
        let port = env.parsed("NCV_PORT", Some(3000u16))?;

        let shopify = ShopifyAdminConfig::from_env(&env)?;
        let catalog = CatalogConfig::from_env(&env)?;

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            host,
            port,
            shopify,
            catalog,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyAdminConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let store = env.required("SHOPIFY_STORE_URL")?;
        let access_token = env.validated_secret("SHOPIFY_ADMIN_API_KEY")?;

        let mut config = Self::new(store, access_token);
        if config.store.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_STORE_URL".to_string(),
                "store domain is empty".to_string(),
            ));
        }

        config.api_version = env.or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);
        config.endpoint_override = env
            .optional("SHOPIFY_GRAPHQL_ENDPOINT")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPIFY_GRAPHQL_ENDPOINT".to_string(), e.to_string())
                })
            })
            .transpose()?;
        config.max_attempts = env.parsed("SHOPIFY_MAX_ATTEMPTS", Some(config.max_attempts))?;
        if config.max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        config.backoff_initial =
            Duration::from_millis(env.parsed("SHOPIFY_BACKOFF_INITIAL_MS", Some(1000u64))?);
        config.backoff_max =
            Duration::from_secs(env.parsed("SHOPIFY_BACKOFF_MAX_SECS", Some(30u64))?);

        // Fail fast on a store value that can't form a URL
        Url::parse(&config.endpoint()).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPIFY_STORE_URL".to_string(), e.to_string())
        })?;

        Ok(config)
    }
}

impl CatalogConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let vendor_page_size = env.bounded(
            "CATALOG_VENDOR_PAGE_SIZE",
            defaults.vendor_page_size,
            MAX_VENDOR_PAGE_SIZE,
        )?;
        let product_page_size = env.bounded(
            "CATALOG_PRODUCT_PAGE_SIZE",
            defaults.product_page_size,
            MAX_PRODUCT_PAGE_SIZE,
        )?;

        let capacity_metafield = env
            .optional("CATALOG_CAPACITY_METAFIELD")
            .map(|raw| MetafieldRef::parse("CATALOG_CAPACITY_METAFIELD", &raw))
            .transpose()?
            .unwrap_or(defaults.capacity_metafield);
        let battery_metafield = env
            .optional("CATALOG_BATTERY_METAFIELD")
            .map(|raw| MetafieldRef::parse("CATALOG_BATTERY_METAFIELD", &raw))
            .transpose()?
            .unwrap_or(defaults.battery_metafield);

        Ok(Self {
            cache_ttl: Duration::from_secs(env.parsed("CATALOG_CACHE_TTL_SECS", Some(600u64))?),
            vendor_page_size,
            product_page_size,
            sweep_deadline: Duration::from_secs(
                env.parsed("CATALOG_SWEEP_DEADLINE_SECS", Some(30u64))?,
            ),
            vendor_category: env.or_default("CATALOG_VENDOR_CATEGORY", &defaults.vendor_category),
            capacity_metafield,
            battery_metafield,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment lookup with typed accessors.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: Option<T>) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => default.ok_or_else(|| ConfigError::MissingEnvVar(key.to_string())),
        }
    }

    /// Parse a page size in `1..=max`, falling back to `default` when unset.
    fn bounded(&self, key: &str, default: u32, max: u32) -> Result<u32, ConfigError> {
        let value: u32 = self.parsed(key, Some(default))?;
        if (1..=max).contains(&value) {
            Ok(value)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 1 and {max}"),
            ))
        }
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Strip scheme and trailing slashes from a store domain.
fn normalize_store_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
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

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real access tokens (shpat_ + 32 hex chars) sit well above this
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
