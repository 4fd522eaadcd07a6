//! RS256 JWT validation against the identity provider's JWKS.
//!
//! - Tokens are size-checked before parsing
//! - Only RS256 is accepted
//! - `exp`, `aud` and `iss` are enforced; `iat` may not be in the future
//!   beyond the configured clock skew

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::auth::AuthError;
use crate::observability::metrics::record_jwt_validation;
use common::jwt::{extract_kid, validate_iat};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// JWT validator bound to one audience and issuer.
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    audience: String,
    issuer: String,
    clock_skew: Duration,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        audience: String,
        issuer: String,
        clock_skew_seconds: i64,
    ) -> Self {
        Self {
            jwks_client,
            audience,
            issuer,
            clock_skew: Duration::from_secs(u64::try_from(clock_skew_seconds).unwrap_or(0)),
        }
    }

    /// Validate a JWT and return its claims.
    ///
    /// 1. Size check and `kid` extraction from the unverified header
    /// 2. RSA key lookup in the JWKS
    /// 3. RS256 signature, `exp`, `aud`, `iss`
    /// 4. `iat` against clock skew
    ///
    /// # Errors
    ///
    /// Each failure maps to the [`AuthError`] variant whose message is
    /// returned to the caller.
    #[instrument(skip_all, name = "tm.auth.jwt.validate")]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let result = self.validate_inner(token).await;
        record_jwt_validation(match &result {
            Ok(_) => "success",
            Err(e) => e.metric_label(),
        });
        result
    }

    async fn validate_inner(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = extract_kid(token).map_err(|e| {
            tracing::debug!(target: "tm.auth.jwt", error = ?e, "Token kid extraction failed");
            AuthError::from(e)
        })?;

        let jwk = self.jwks_client.get_key(&kid).await?;

        let claims = verify_token(token, &jwk, &self.audience, &self.issuer)?;

        if let Some(iat) = claims.iat {
            validate_iat(iat, self.clock_skew).map_err(|e| {
                tracing::debug!(target: "tm.auth.jwt", error = ?e, "Token iat validation failed");
                AuthError::from(e)
            })?;
        }

        tracing::debug!(target: "tm.auth.jwt", "Token validated successfully");
        Ok(claims)
    }
}

/// Verify signature and registered claims with one RSA key.
pub(crate) fn verify_token(
    token: &str,
    jwk: &Jwk,
    audience: &str,
    issuer: &str,
) -> Result<Claims, AuthError> {
    if jwk.kty != "RSA" {
        tracing::warn!(target: "tm.auth.jwt", kty = %jwk.kty, "Unexpected JWK key type");
        return Err(AuthError::KeyNotFound);
    }

    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        tracing::error!(target: "tm.auth.jwt", kid = %jwk.kid, "JWK missing n or e");
        return Err(AuthError::KeyNotFound);
    };

    let decoding_key = DecodingKey::from_rsa_components(n, e).map_err(|e| {
        tracing::error!(target: "tm.auth.jwt", error = %e, "Invalid RSA key components");
        AuthError::Malformed
    })?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.leeway = 0;
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "tm.auth.jwt", error = %e, "Token verification failed");
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::ClaimsMismatch,
            ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
                AuthError::ClaimsMismatch
            }
            _ => AuthError::Malformed,
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tm_test_utils::crypto_fixtures::{
        PRIMARY_KID, PRIMARY_PRIVATE_PEM, PRIMARY_N, RSA_E, SECONDARY_PRIVATE_PEM,
    };

    const AUD: &str = "http://foo.com";
    const ISS: &str = "https://foo.com/";

    fn primary_jwk() -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: PRIMARY_KID.to_string(),
            n: Some(PRIMARY_N.to_string()),
            e: Some(RSA_E.to_string()),
            alg: Some("RS256".to_string()),
            key_use: Some("sig".to_string()),
        }
    }

    fn sign(pem: &str, claims: &serde_json::Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(PRIMARY_KID.to_string());
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
        encode(&header, claims, &key).unwrap()
    }

    fn claims(aud: &str, iss: &str, exp_offset: i64) -> serde_json::Value {
        let now = chrono::Utc::now().timestamp();
        serde_json::json!({
            "sub": "auth0|3f2504e0-4f89-41d3-9a0c-0305e82c3301",
            "aud": aud,
            "iss": iss,
            "iat": now,
            "exp": now + exp_offset,
        })
    }

    #[test]
    fn test_verify_token_valid() {
        let token = sign(PRIMARY_PRIVATE_PEM, &claims(AUD, ISS, 3600));

        let claims = verify_token(&token, &primary_jwk(), AUD, ISS).unwrap();
        assert_eq!(claims.sub, "auth0|3f2504e0-4f89-41d3-9a0c-0305e82c3301");
    }

    #[test]
    fn test_verify_token_audience_list() {
        let now = chrono::Utc::now().timestamp();
        let token = sign(
            PRIMARY_PRIVATE_PEM,
            &serde_json::json!({
                "sub": "u",
                "aud": [AUD, "https://foo.com/userinfo"],
                "iss": ISS,
                "exp": now + 60,
            }),
        );

        assert!(verify_token(&token, &primary_jwk(), AUD, ISS).is_ok());
    }

    #[test]
    fn test_verify_token_expired() {
        let token = sign(PRIMARY_PRIVATE_PEM, &claims(AUD, ISS, -3600));

        let err = verify_token(&token, &primary_jwk(), AUD, ISS).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        assert_eq!(err.to_string(), "token is expired");
    }

    #[test]
    fn test_verify_token_wrong_audience() {
        let token = sign(PRIMARY_PRIVATE_PEM, &claims("http://other.com", ISS, 3600));

        let err = verify_token(&token, &primary_jwk(), AUD, ISS).unwrap_err();
        assert!(matches!(err, AuthError::ClaimsMismatch));
        assert_eq!(err.to_string(), "please check the audience and issuer");
    }

    #[test]
    fn test_verify_token_wrong_issuer() {
        let token = sign(
            PRIMARY_PRIVATE_PEM,
            &claims(AUD, "https://evil.example/", 3600),
        );

        let err = verify_token(&token, &primary_jwk(), AUD, ISS).unwrap_err();
        assert!(matches!(err, AuthError::ClaimsMismatch));
    }

    #[test]
    fn test_verify_token_signed_by_other_key() {
        let token = sign(SECONDARY_PRIVATE_PEM, &claims(AUD, ISS, 3600));

        let err = verify_token(&token, &primary_jwk(), AUD, ISS).unwrap_err();
        assert!(matches!(err, AuthError::Malformed));
        assert_eq!(err.to_string(), "Unable to parse authentication token");
    }

    #[test]
    fn test_verify_token_rejects_non_rsa_key() {
        let mut jwk = primary_jwk();
        jwk.kty = "OKP".to_string();
        let token = sign(PRIMARY_PRIVATE_PEM, &claims(AUD, ISS, 3600));

        assert!(matches!(
            verify_token(&token, &jwk, AUD, ISS),
            Err(AuthError::KeyNotFound)
        ));
    }

    #[test]
    fn test_verify_token_rejects_key_without_modulus() {
        let mut jwk = primary_jwk();
        jwk.n = None;
        let token = sign(PRIMARY_PRIVATE_PEM, &claims(AUD, ISS, 3600));

        assert!(matches!(
            verify_token(&token, &jwk, AUD, ISS),
            Err(AuthError::KeyNotFound)
        ));
    }

    #[test]
    fn test_verify_token_rejects_garbage() {
        let err = verify_token("a.b.c", &primary_jwk(), AUD, ISS).unwrap_err();
        assert!(matches!(err, AuthError::Malformed));
    }

    #[test]
    fn test_validator_clock_skew_conversion() {
        let client = Arc::new(JwksClient::new("http://localhost/jwks".to_string()));
        let validator = JwtValidator::new(client, AUD.to_string(), ISS.to_string(), 300);
        assert_eq!(validator.clock_skew, Duration::from_secs(300));
    }
}
