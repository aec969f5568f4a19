//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHEETS_API_URL` - Base URL of the spreadsheet-backed product API
//! - `RTDB_URL` - Base URL of the realtime document database
//!
//! ## Optional
//! - `SHEETS_API_TOKEN` - Token appended to product API requests
//! - `RTDB_AUTH_TOKEN` - Auth token for realtime database requests
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CART_STORE_PATH` - Cart persistence file (default: data/cart.json)
//! - `CATALOG_TTL_SECS` - Product cache TTL in seconds (default: 300)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
#[derive(Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the spreadsheet-backed product API
    pub sheets_api_url: Url,
    /// Optional token for product API requests
    pub sheets_api_token: Option<SecretString>,
    /// Base URL of the realtime document database
    pub rtdb_url: Url,
    /// Optional auth token for realtime database requests
    pub rtdb_auth_token: Option<SecretString>,
    /// File the cart store persists to
    pub cart_store_path: PathBuf,
    /// Product catalog cache TTL in seconds
    pub catalog_ttl_secs: u64,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sheets_api_url", &self.sheets_api_url.as_str())
            .field("sheets_api_token", &self.sheets_api_token.as_ref().map(|_| "[REDACTED]"))
            .field("rtdb_url", &self.rtdb_url.as_str())
            .field("rtdb_auth_token", &self.rtdb_auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("cart_store_path", &self.cart_store_path)
            .field("catalog_ttl_secs", &self.catalog_ttl_secs)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Used directly by tests to avoid touching the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_optional(&lookup, "STOREFRONT_HOST")?
            .unwrap_or_else(|| IpAddr::from([127, 0, 0, 1]));
        let port = parse_optional(&lookup, "STOREFRONT_PORT")?.unwrap_or(3000);
        let catalog_ttl_secs = parse_optional(&lookup, "CATALOG_TTL_SECS")?.unwrap_or(300);
        let cart_store_path = lookup("CART_STORE_PATH")
            .map_or_else(|| PathBuf::from("data/cart.json"), PathBuf::from);

        Ok(Self {
            host,
            port,
            sheets_api_url: parse_required(&lookup, "SHEETS_API_URL")?,
            sheets_api_token: lookup("SHEETS_API_TOKEN").map(SecretString::from),
            rtdb_url: parse_required(&lookup, "RTDB_URL")?,
            rtdb_auth_token: lookup("RTDB_AUTH_TOKEN").map(SecretString::from),
            cart_store_path,
            catalog_ttl_secs,
        })
    }

    /// The socket address the server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_required<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;
    raw.parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
        })
        .transpose()
}
