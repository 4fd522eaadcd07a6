//! Protected route authentication tests.
//!
//! Every `/v1` route except `/v1/authorize` resolves the bearer token to a
//! known user; anything less is a 401 `Unauthorized`.

use serde_json::Value;
use sqlx::PgPool;
use tm_test_utils::{
    error_of, seed_user, subject_for, MockJwks, TestApi, TestTmServer, TEST_USER_ALICE,
    TEST_USER_BOB,
};

#[sqlx::test(migrations = "../../migrations")]
async fn test_me_returns_user(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;

    let response = server.api_for(TEST_USER_ALICE).get("/v1/users/me").await?;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["uid"], TEST_USER_ALICE.to_string());
    assert_eq!(body["risk"], 2);
    assert!(body["email"].as_str().is_some_and(|e| e.ends_with("@example.com")));
    assert!(body.get("encrypted_password").is_none());
    assert!(body.get("id").is_none());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_header_is_unauthorized(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;

    let response = reqwest::get(format!("{}/v1/brokers", server.url())).await?;

    assert!(response.headers().contains_key("www-authenticate"));
    assert_eq!(error_of(response).await?, (401, "Unauthorized".to_string()));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unknown_user_is_unauthorized(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;

    let response = server.api_for(TEST_USER_BOB).get("/v1/brokers").await?;

    assert_eq!(error_of(response).await?, (401, "Unauthorized".to_string()));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_subject_that_is_not_a_uuid(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    let token = server.token().for_subject("auth0|not-a-uuid").sign();

    let response = TestApi::new(server.url(), token).get("/v1/users/me").await?;

    assert_eq!(error_of(response).await?, (401, "Unauthorized".to_string()));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_expired_token_is_unauthorized(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;
    let token = server
        .token()
        .for_subject(&subject_for(TEST_USER_ALICE))
        .expires_in(-60)
        .sign();

    let response = TestApi::new(server.url(), token).get("/v1/strategies").await?;

    assert_eq!(error_of(response).await?, (401, "Unauthorized".to_string()));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_token_without_iat_is_accepted(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;
    let token = server
        .token()
        .for_subject(&subject_for(TEST_USER_ALICE))
        .without_iat()
        .sign();

    let response = TestApi::new(server.url(), token).get("/v1/strategies").await?;

    assert_eq!(response.status(), 200);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unavailable_key_set_is_503(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn_with_jwks(pool, MockJwks::failing().await).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;

    let response = server.api_for(TEST_USER_ALICE).get("/v1/brokers").await?;

    assert_eq!(response.status(), 503);

    Ok(())
}
