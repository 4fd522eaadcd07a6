//! Deterministic cryptographic fixtures for testing
//!
//! Two fixed 2048-bit RSA keys. The primary key is published in the mock
//! JWKS; the secondary one signs tokens that must fail verification.

use serde_json::{json, Value};

/// `kid` of the primary key.
pub const PRIMARY_KID: &str = "tm-test-key-primary";

/// `kid` of the secondary key.
pub const SECONDARY_KID: &str = "tm-test-key-secondary";

/// PKCS#1 PEM of the primary private key.
pub const PRIMARY_PRIVATE_PEM: &str = include_str!("../fixtures/rsa_primary.pem");

/// PKCS#1 PEM of the secondary private key.
pub const SECONDARY_PRIVATE_PEM: &str = include_str!("../fixtures/rsa_secondary.pem");

/// Base64url modulus of the primary key.
pub const PRIMARY_N: &str = "17sY9R1wtrCgqEzeAhLGlRE8SXX0p-745k_SoVUm0-ygUQcQ9MUIj7rzJOeAyVJBBv4VT9RUBZxpNtAaTq9cRxsmdTPCvH1ZB2O_lxdEUsublWIAtlc7w2BdSwlk423ghqvt2xfFRPkSCmBn4Y-yZImO23GDwwde5_uHk9CktSPS_dRFPX9Bm0fIaR4wuIY0OGzQfypON0pSp7v1lT5na_0lj1hAPTwdqvvNV7LXhQ0MZ_el5BzG1uyc0nDo4-oTCPgfuqI525PAOIXLRYY_86l93O8aKnmR8Aa7Xe8Z4Rx2IYcQDX87QLYglnTQF_FGqccf-YKrBByB8cf_ZwBGHw";

/// Base64url modulus of the secondary key.
pub const SECONDARY_N: &str = "7ZPf5ix0IjsXHEf-pPoeQC86VcNL64oaTD8mdclRaJoBICq2SDszxQPHmyS1-ydUpUB61Yw4we9jOHzcgUemF9r8Q4tcwXZl2BHdO5USuUt1tkfXZg8-d3Inxkz2Tut1mSTLJt_TuwlHJcneSi0B62PPM8Dt95PWsslPQjXRKWgWqrEdpjxwiJ-FaCsXPcY82AYvAnPT8LfNaPgclZeZLfU0Xog1vAvv-arwLkJ2kS1tomVGOctUgMGAGamXfsheVgxxRVuVXFnQ3_kiU4ZkaJUijcOC_7B9SkxztosmxNdksf6ZONaAcnW2PC6cFWiP8oLUOA4HcjPTZB9HbTviGw";

/// Public exponent shared by both keys (65537).
pub const RSA_E: &str = "AQAB";

/// A single RSA signing JWK.
pub fn rsa_jwk(kid: &str, n: &str) -> Value {
    json!({
        "kty": "RSA",
        "kid": kid,
        "use": "sig",
        "alg": "RS256",
        "n": n,
        "e": RSA_E,
    })
}

/// Key set publishing only the primary key.
pub fn primary_jwks() -> Value {
    json!({ "keys": [rsa_jwk(PRIMARY_KID, PRIMARY_N)] })
}

/// Key set publishing both keys.
pub fn full_jwks() -> Value {
    json!({
        "keys": [
            rsa_jwk(PRIMARY_KID, PRIMARY_N),
            rsa_jwk(SECONDARY_KID, SECONDARY_N),
        ]
    })
}
