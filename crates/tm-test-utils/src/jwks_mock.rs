//! Identity provider stand-in serving the fixture key set.

use crate::crypto_fixtures::primary_jwks;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the service fetches keys from.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// A wiremock server answering `GET /.well-known/jwks.json`.
pub struct MockJwks {
    server: MockServer,
}

impl MockJwks {
    /// Serve the primary key only.
    pub async fn start() -> Self {
        Self::serving(primary_jwks()).await
    }

    /// Serve an arbitrary key set body.
    pub async fn serving(jwks: Value) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Answer every key set request with a server error.
    pub async fn failing() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Base URL, used as the `JWKS_DOMAIN` of the service.
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// The `iss` the service expects for this provider.
    pub fn issuer(&self) -> String {
        format!("{}/", self.server.uri())
    }
}
