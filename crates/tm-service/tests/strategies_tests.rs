//! Strategy endpoint integration tests.

use serde_json::{json, Value};
use sqlx::PgPool;
use tm_test_utils::{error_of, seed_user, TestTmServer, TEST_UNKNOWN_UID, TEST_USER_ALICE, TEST_USER_BOB};

#[sqlx::test(migrations = "../../migrations")]
async fn test_crud_flow(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;
    let alice = server.api_for(TEST_USER_ALICE);

    let uid = alice
        .create("/v1/strategies", &json!({"name": "Breakout"}))
        .await?;
    let path = format!("/v1/strategies/{uid}");

    let body: Value = alice.get(&path).await?.json().await?;
    assert_eq!(body, json!({"uid": uid, "name": "Breakout"}));

    assert_eq!(
        alice.put(&path, &json!({"name": "Pullback"})).await?.status(),
        204
    );

    let body: Value = alice.get("/v1/strategies").await?.json().await?;
    assert_eq!(body, json!({"strategies": [{"uid": uid, "name": "Pullback"}]}));

    assert_eq!(alice.delete(&path).await?.status(), 204);
    assert_eq!(
        error_of(alice.get(&path).await?).await?,
        (404, "Strategy not found".to_string())
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_validation(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;
    let alice = server.api_for(TEST_USER_ALICE);

    assert_eq!(
        error_of(alice.post("/v1/strategies", &json!({"label": "x"})).await?).await?,
        (400, "'name' is a required field".to_string())
    );

    let uid = alice
        .create("/v1/strategies", &json!({"name": "Breakout"}))
        .await?;
    assert_eq!(
        error_of(
            alice
                .put(&format!("/v1/strategies/{uid}"), &json!({"name": ["a"]}))
                .await?
        )
        .await?,
        (400, "'name' must be of type string".to_string())
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_strategy_is_404_every_time(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;
    let alice = server.api_for(TEST_USER_ALICE);
    let not_found = (404, "Strategy not found".to_string());

    for path in [
        format!("/v1/strategies/{TEST_UNKNOWN_UID}"),
        "/v1/strategies/42".to_string(),
    ] {
        for _ in 0..2 {
            assert_eq!(error_of(alice.put(&path, &json!({})).await?).await?, not_found);
            assert_eq!(error_of(alice.delete(&path).await?).await?, not_found);
            assert_eq!(error_of(alice.get(&path).await?).await?, not_found);
        }
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_other_users_strategies_are_invisible(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    seed_user(server.pool(), TEST_USER_ALICE).await?;
    seed_user(server.pool(), TEST_USER_BOB).await?;
    let alice = server.api_for(TEST_USER_ALICE);
    let bob = server.api_for(TEST_USER_BOB);

    let uid = alice
        .create("/v1/strategies", &json!({"name": "Breakout"}))
        .await?;
    let path = format!("/v1/strategies/{uid}");

    assert_eq!(error_of(bob.get(&path).await?).await?.0, 404);
    assert_eq!(
        error_of(bob.put(&path, &json!({"name": "x"})).await?).await?.0,
        404
    );
    assert_eq!(error_of(bob.delete(&path).await?).await?.0, 404);

    let body: Value = bob.get("/v1/strategies").await?.json().await?;
    assert_eq!(body, json!({"strategies": []}));

    assert_eq!(alice.get(&path).await?.status(), 200);

    Ok(())
}
