//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port, falling back to `PORT` (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:{port}`)
//! - `STOREFRONT_PUBLIC_DIR` - Static files, including `db.json`
//!   (default: crates/storefront/public)
//! - `CATALOGUE_SOURCE` - Catalogue document URL or file path
//!   (default: crates/storefront/public/db.json)
//! - `CATALOGUE_CACHE_TTL_SECS` - How long a fetched document is reused (default: 300)
//! - `STOREFRONT_STORAGE_DIR` - Root of per-visitor storage (default: .mebel/visitors)
//! - `VISITOR_IDLE_SECS` - Idle time before a visitor's store is unloaded (default: 1800)
//! - `SESSION_CAPACITY` - Most sessions held in memory at once (default: 100000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::catalogue::CatalogueSource;

const DEFAULT_PUBLIC_DIR: &str = "crates/storefront/public";
const DEFAULT_CATALOGUE_SOURCE: &str = "crates/storefront/public/db.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
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
    /// Directory served as static files
    pub public_dir: PathBuf,
    /// Where the catalogue document is read from
    pub catalogue_source: CatalogueSource,
    /// Lifetime of a cached catalogue document
    pub catalogue_ttl: Duration,
    /// Root directory for per-visitor key-value storage
    pub storage_dir: PathBuf,
    /// Idle time after which a visitor's store is dropped from memory
    pub visitor_idle: Duration,
    /// Most sessions held in memory; the least recently used are evicted
    pub session_capacity: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host: IpAddr = env.parse_or_default("STOREFRONT_HOST", "127.0.0.1")?;

        // PORT is what most hosting platforms set
        let port: u16 = match env.optional("STOREFRONT_PORT") {
            Some(_) => env.parse_or_default("STOREFRONT_PORT", "3000")?,
            None => env.parse_or_default("PORT", "3000")?,
        };

        let base_url = env.or_default("STOREFRONT_BASE_URL", &format!("http://localhost:{port}"));
        let public_dir = PathBuf::from(env.or_default("STOREFRONT_PUBLIC_DIR", DEFAULT_PUBLIC_DIR));

        let location = env.or_default("CATALOGUE_SOURCE", DEFAULT_CATALOGUE_SOURCE);
        let catalogue_source = CatalogueSource::from_location(&location).map_err(|e| {
            ConfigError::InvalidEnvVar("CATALOGUE_SOURCE".to_string(), e.to_string())
        })?;

        let catalogue_ttl = Duration::from_secs(env.parse_or_default("CATALOGUE_CACHE_TTL_SECS", "300")?);
        let storage_dir = PathBuf::from(env.or_default("STOREFRONT_STORAGE_DIR", ".mebel/visitors"));
        let visitor_idle = Duration::from_secs(env.parse_or_default("VISITOR_IDLE_SECS", "1800")?);
        let session_capacity: u64 = env.parse_or_default("SESSION_CAPACITY", "100000")?;

        if catalogue_ttl.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOGUE_CACHE_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if session_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SESSION_CAPACITY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            public_dir,
            catalogue_source,
            catalogue_ttl,
            storage_dir,
            visitor_idle,
            session_capacity,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get and parse a variable with a default value.
    fn parse_or_default<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
