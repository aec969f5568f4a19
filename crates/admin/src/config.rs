//! Admin configuration loaded from environment variables.
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
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)

use std::net::{IpAddr, SocketAddr};

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

/// Admin application configuration.
#[derive(Clone)]
pub struct AdminConfig {
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
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sheets_api_url", &self.sheets_api_url.as_str())
            .field("sheets_api_token", &self.sheets_api_token.as_ref().map(|_| "[REDACTED]"))
            .field("rtdb_url", &self.rtdb_url.as_str())
            .field("rtdb_auth_token", &self.rtdb_auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AdminConfig {
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
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = match lookup("ADMIN_HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|e: std::net::AddrParseError| {
                    ConfigError::InvalidEnvVar("ADMIN_HOST".into(), e.to_string())
                })?,
            None => IpAddr::from([127, 0, 0, 1]),
        };
        let port = match lookup("ADMIN_PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnvVar("ADMIN_PORT".into(), e.to_string())
            })?,
            None => 3001,
        };

        let required_url = |name: &str| -> Result<Url, ConfigError> {
            let raw = lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;
            raw.parse()
                .map_err(|e: url::ParseError| ConfigError::InvalidEnvVar(name.into(), e.to_string()))
        };

        Ok(Self {
            host,
            port,
            sheets_api_url: required_url("SHEETS_API_URL")?,
            sheets_api_token: lookup("SHEETS_API_TOKEN").map(SecretString::from),
            rtdb_url: required_url("RTDB_URL")?,
            rtdb_auth_token: lookup("RTDB_AUTH_TOKEN").map(SecretString::from),
        })
    }

    /// The socket address the server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_required() {
        let config = AdminConfig::from_lookup(|name| match name {
            "SHEETS_API_URL" => Some("https://sheets.example.com/api".into()),
            "RTDB_URL" => Some("https://store.firebaseio.example".into()),
            _ => None,
        })
        .expect("config loads");
        assert_eq!(config.port, 3001);

        let err = AdminConfig::from_lookup(|_| None).expect_err("must fail");
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }
}
