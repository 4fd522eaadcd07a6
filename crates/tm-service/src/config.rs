//! Trades Management service configuration.
//!
//! Configuration is loaded from environment variables. The database URL is
//! held as a secret and redacted in Debug output.

use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default identity provider domain.
pub const DEFAULT_JWKS_DOMAIN: &str = "foo.com";

/// Default expected `aud` claim.
pub const DEFAULT_API_AUDIENCE: &str = "http://foo.com";

/// Default JWKS cache lifetime in seconds.
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 300;

/// Largest accepted JWKS cache lifetime in seconds (one day).
pub const MAX_JWKS_CACHE_TTL_SECONDS: u64 = 86_400;

/// Default database pool size.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Default graceful-shutdown drain period in seconds.
pub const DEFAULT_DRAIN_SECONDS: u64 = 5;

/// Path of the key set below the identity provider base URL.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Trades Management service configuration.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: SecretString,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Identity provider base URL, scheme included, no trailing slash.
    pub jwks_base_url: String,

    /// Expected `aud` claim of access tokens.
    pub api_audience: String,

    /// JWT clock skew tolerance in seconds for `iat` validation.
    pub jwt_clock_skew_seconds: i64,

    /// JWKS cache lifetime; 0 disables caching.
    pub jwks_cache_ttl_seconds: u64,

    /// Maximum size of the database pool.
    pub db_max_connections: u32,

    /// Seconds to wait after a shutdown signal before exiting.
    pub drain_seconds: u64,
}

impl Config {
    /// URL of the identity provider's key set.
    #[must_use]
    pub fn jwks_url(&self) -> String {
        format!("{}{}", self.jwks_base_url, JWKS_PATH)
    }

    /// Expected `iss` claim of access tokens.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("{}/", self.jwks_base_url)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwks_base_url", &self.jwks_base_url)
            .field("api_audience", &self.api_audience)
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("jwks_cache_ttl_seconds", &self.jwks_cache_ttl_seconds)
            .field("db_max_connections", &self.db_max_connections)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid numeric configuration: {0}")]
    InvalidNumber(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let domain = vars
            .get("JWKS_DOMAIN")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_JWKS_DOMAIN);
        let jwks_base_url = normalize_base_url(domain);

        let api_audience = vars
            .get("API_AUDIENCE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_API_AUDIENCE.to_string());

        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            let max = i64::try_from(MAX_CLOCK_SKEW.as_secs()).unwrap_or(i64::MAX);
            if value > max {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    max, value
                )));
            }

            value
        } else {
            i64::try_from(DEFAULT_CLOCK_SKEW.as_secs()).unwrap_or(300)
        };

        let jwks_cache_ttl_seconds = parse_number(
            vars,
            "JWKS_CACHE_TTL_SECONDS",
            DEFAULT_JWKS_CACHE_TTL_SECONDS,
        )?;
        if jwks_cache_ttl_seconds > MAX_JWKS_CACHE_TTL_SECONDS {
            return Err(ConfigError::InvalidNumber(format!(
                "JWKS_CACHE_TTL_SECONDS must not exceed {} seconds, got {}",
                MAX_JWKS_CACHE_TTL_SECONDS, jwks_cache_ttl_seconds
            )));
        }

        let db_max_connections: u32 =
            parse_number(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidNumber(
                "DB_MAX_CONNECTIONS must be greater than 0".to_string(),
            ));
        }

        let drain_seconds = parse_number(vars, "TM_DRAIN_SECONDS", DEFAULT_DRAIN_SECONDS)?;

        Ok(Config {
            database_url: SecretString::from(database_url),
            bind_address,
            jwks_base_url,
            api_audience,
            jwt_clock_skew_seconds,
            jwks_cache_ttl_seconds,
            db_max_connections,
            drain_seconds,
        })
    }
}

fn parse_number<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match vars.get(name) {
        Some(value_str) => value_str.parse().map_err(|e| {
            ConfigError::InvalidNumber(format!(
                "{} must be a valid non-negative integer, got '{}': {}",
                name, value_str, e
            ))
        }),
        None => Ok(default),
    }
}

/// `foo.com` becomes `https://foo.com`; values with a scheme are kept.
fn normalize_base_url(domain: &str) -> String {
    let base = if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    };
    base.trim_end_matches('/').to_string()
}
