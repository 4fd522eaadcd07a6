//! Builder patterns for test tokens
//!
//! Produces RS256 JWTs signed with the fixture keys.

use crate::crypto_fixtures::{PRIMARY_KID, PRIMARY_PRIVATE_PEM};
use crate::test_ids::TEST_AUDIENCE;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for signed test JWTs
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new(&issuer)
///     .for_subject("auth0|3f2504e0-4f89-41d3-9a0c-0305e82c3301")
///     .expires_in(-60)
///     .sign();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    aud: String,
    iss: String,
    exp: i64,
    iat: Option<i64>,
    kid: Option<String>,
    private_pem: &'static str,
}

impl TestTokenBuilder {
    /// Token valid for an hour, signed with the primary key.
    pub fn new(issuer: &str) -> Self {
        let now = Utc::now();
        Self {
            sub: "test-subject".to_string(),
            aud: TEST_AUDIENCE.to_string(),
            iss: issuer.to_string(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: Some(now.timestamp()),
            kid: Some(PRIMARY_KID.to_string()),
            private_pem: PRIMARY_PRIVATE_PEM,
        }
    }

    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.aud = audience.to_string();
        self
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.iss = issuer.to_string();
        self
    }

    /// Set expiration in seconds from now; negative values are in the past.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = Some(timestamp);
        self
    }

    pub fn without_iat(mut self) -> Self {
        self.iat = None;
        self
    }

    /// `None` omits the header field.
    pub fn with_kid(mut self, kid: Option<&str>) -> Self {
        self.kid = kid.map(str::to_string);
        self
    }

    /// Sign with another fixture key, keeping the configured `kid`.
    pub fn signed_with(mut self, private_pem: &'static str) -> Self {
        self.private_pem = private_pem;
        self
    }

    /// The claims as a JSON value.
    pub fn claims(&self) -> Value {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(self.sub));
        claims.insert("aud".to_string(), json!(self.aud));
        claims.insert("iss".to_string(), json!(self.iss));
        claims.insert("exp".to_string(), json!(self.exp));
        if let Some(iat) = self.iat {
            claims.insert("iat".to_string(), json!(iat));
        }
        Value::Object(claims)
    }

    /// Encode and sign the token.
    pub fn sign(self) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.kid.clone();
        let key = EncodingKey::from_rsa_pem(self.private_pem.as_bytes())
            .expect("fixture key should parse");
        encode(&header, &self.claims(), &key).expect("token should encode")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let claims = TestTokenBuilder::new("https://idp.test/").claims();

        assert_eq!(claims["sub"], "test-subject");
        assert_eq!(claims["aud"], TEST_AUDIENCE);
        assert_eq!(claims["iss"], "https://idp.test/");
        assert!(claims["exp"].as_i64().unwrap() > Utc::now().timestamp());
        assert!(claims.get("iat").is_some());
    }

    #[test]
    fn test_builder_without_iat() {
        let claims = TestTokenBuilder::new("https://idp.test/")
            .without_iat()
            .claims();
        assert!(claims.get("iat").is_none());
    }

    #[test]
    fn test_signed_token_has_three_parts() {
        let token = TestTokenBuilder::new("https://idp.test/").sign();
        assert_eq!(token.split('.').count(), 3);
    }
}
