//! JWT claims structure.
//!
//! The `sub` field identifies a person and is redacted in Debug output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims of a validated identity provider access token.
///
/// `aud` and `iss` are checked by the validator and not kept here.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, `provider|user-uuid` - redacted in Debug output.
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Space-separated scopes, when the provider includes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims = Claims {
            sub: "auth0|3f2504e0-4f89-41d3-9a0c-0305e82c3301".to_string(),
            exp: 1_234_567_890,
            iat: Some(1_234_567_800),
            scope: None,
        };

        let debug_str = format!("{:?}", claims);

        assert!(!debug_str.contains("auth0|"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_claims_deserialize_provider_token() {
        let json = r#"{
            "iss": "https://foo.com/",
            "sub": "auth0|3f2504e0-4f89-41d3-9a0c-0305e82c3301",
            "aud": ["http://foo.com", "https://foo.com/userinfo"],
            "iat": 1700000000,
            "exp": 1700086400,
            "azp": "client",
            "scope": "openid profile"
        }"#;

        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "auth0|3f2504e0-4f89-41d3-9a0c-0305e82c3301");
        assert_eq!(claims.exp, 1_700_086_400);
        assert_eq!(claims.iat, Some(1_700_000_000));
        assert_eq!(claims.scope.as_deref(), Some("openid profile"));
    }

    #[test]
    fn test_claims_without_iat() {
        let claims: Claims = serde_json::from_str(r#"{"sub": "u", "exp": 1}"#).unwrap();
        assert!(claims.iat.is_none());
        assert!(claims.scope.is_none());

        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("iat"));
        assert!(!json.contains("scope"));
    }
}
