//! JWKS client for fetching and caching the identity provider's RSA keys.
//!
//! Keys are fetched from `<base>/.well-known/jwks.json` and cached by `kid`
//! for a configurable TTL. A TTL of zero fetches the key set on every lookup.

use crate::auth::AuthError;
use crate::observability::metrics::record_jwks_fetch;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// Default cache TTL in seconds (5 minutes).
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Cache lifetime used when the configured TTL cannot be added to the clock.
const FALLBACK_MAX_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// HTTP timeout for key set fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON Web Key as published by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" for RS256 keys).
    pub kty: String,

    /// Key ID, matched against the token header.
    pub kid: String,

    /// RSA modulus (base64url).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url).
    #[serde(default)]
    pub e: Option<String>,

    #[serde(default)]
    pub alg: Option<String>,

    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// Key set document.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<Jwk>,
}

struct CachedJwks {
    keys: HashMap<String, Jwk>,
    expires_at: Instant,
}

/// Thread-safe JWKS client with a TTL cache.
pub struct JwksClient {
    jwks_url: String,
    http_client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedJwks>>>,
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a client with the default 5 minute cache.
    pub fn new(jwks_url: String) -> Self {
        Self::with_ttl(jwks_url, Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS))
    }

    /// Create a client with a custom cache TTL.
    pub fn with_ttl(jwks_url: String, cache_ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "tm.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
        }
    }

    /// Get a JWK by key ID, fetching the key set when the cache is empty
    /// or expired.
    ///
    /// # Errors
    ///
    /// - `AuthError::KeyNotFound` if no key carries `kid`
    /// - `AuthError::JwksUnavailable` if the key set cannot be fetched or parsed
    #[instrument(skip_all, name = "tm.auth.jwks.get_key")]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    if let Some(key) = cached.keys.get(kid) {
                        tracing::debug!(target: "tm.auth.jwks", kid = %kid, "JWKS cache hit");
                        return Ok(key.clone());
                    }
                    tracing::debug!(target: "tm.auth.jwks", kid = %kid, "Key not found in JWKS cache");
                    return Err(AuthError::KeyNotFound);
                }
            }
        }

        let keys = self.refresh_cache().await?;

        if let Some(key) = keys.get(kid) {
            return Ok(key.clone());
        }

        tracing::warn!(target: "tm.auth.jwks", kid = %kid, "Key not found in JWKS after refresh");
        Err(AuthError::KeyNotFound)
    }

    /// Fetch the key set and replace the cache. Returns the fresh key map so
    /// a zero TTL still serves the lookup that triggered the fetch.
    #[instrument(skip_all, name = "tm.auth.jwks.refresh")]
    async fn refresh_cache(&self) -> Result<HashMap<String, Jwk>, AuthError> {
        tracing::debug!(target: "tm.auth.jwks", url = %self.jwks_url, "Fetching JWKS");

        let keys = match self.fetch().await {
            Ok(keys) => {
                record_jwks_fetch("success");
                keys
            }
            Err(e) => {
                record_jwks_fetch("error");
                return Err(e);
            }
        };

        tracing::info!(
            target: "tm.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        let now = Instant::now();
        let expires_at = now
            .checked_add(self.cache_ttl)
            .or_else(|| {
                tracing::warn!(
                    target: "tm.auth.jwks",
                    ttl_secs = self.cache_ttl.as_secs(),
                    "JWKS cache TTL out of range, capping"
                );
                now.checked_add(FALLBACK_MAX_CACHE_TTL)
            })
            .unwrap_or(now);

        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys: keys.clone(),
            expires_at,
        });

        Ok(keys)
    }

    async fn fetch(&self) -> Result<HashMap<String, Jwk>, AuthError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "tm.auth.jwks", error = %e, "Failed to fetch JWKS");
                AuthError::JwksUnavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "tm.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::JwksUnavailable(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "tm.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::JwksUnavailable(e.to_string())
        })?;

        Ok(jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect())
    }
}
