//! Authenticated HTTP client for E2E tests.

use reqwest::{Client, Response};
use serde_json::Value;

/// Sends requests to a test server as one user.
///
/// # Example
/// ```rust,ignore
/// let alice = server.api_for(TEST_USER_ALICE);
/// let response = alice.post("/v1/brokers", &json!({"name": "XP"})).await?;
/// assert_eq!(response.status(), 201);
/// ```
pub struct TestApi {
    client: Client,
    base_url: String,
    token: String,
}

impl TestApi {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            token,
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Response, reqwest::Error> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
    }

    /// POST a raw, possibly invalid, body.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> Result<Response, reqwest::Error> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Response, reqwest::Error> {
        self.client
            .put(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client
            .delete(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await
    }

    /// POST `body` to a collection, expect 201 and return the new uid.
    pub async fn create(&self, path: &str, body: &Value) -> Result<String, anyhow::Error> {
        let response = self.post(path, body).await?;
        let status = response.status();
        let json: Value = response.json().await?;
        anyhow::ensure!(status == 201, "create {path} returned {status}: {json}");
        json["uid"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("create {path} returned no uid: {json}"))
    }
}

/// Status and `error.message` of a failed response.
pub async fn error_of(response: Response) -> Result<(u16, String), anyhow::Error> {
    let status = response.status().as_u16();
    let body: Value = response.json().await?;
    let message = body["error"]["message"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("no error message in {body}"))?
        .to_string();
    Ok((status, message))
}
