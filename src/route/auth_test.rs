use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    core::test_utils::{attach_role_with_permissions, generate_test_user},
    init_openapi_route,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_auth_login(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "login@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: valid credentials
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "login@example.com", "password": "password"}))
        .send()
        .await;

    // Expect 1: token pair in the envelope
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert!(!data.object().get("token").string().is_empty());
    assert!(!data.object().get("refresh_token").string().is_empty());
    assert_eq!(data.object().get("token_type").string(), "Bearer");

    // When 2: wrong password
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "login@example.com", "password": "nope"}))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When 3: unknown account
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "nobody@example.com", "password": "password"}))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_auth_refresh_and_logout(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "refresh@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: rotate tokens from the refresh token
    let resp = cli
        .post("/api/auth/refresh")
        .body_json(&json!({"refresh_token": test_user.refresh_token}))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let new_token = body
        .value()
        .object()
        .get("data")
        .object()
        .get("token")
        .string()
        .to_string();

    // When 2: an access token is not accepted as a refresh token
    let resp = cli
        .post("/api/auth/refresh")
        .body_json(&json!({"refresh_token": test_user.token}))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::UNAUTHORIZED);

    // When 3: logout kills the session
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", new_token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let resp = cli
        .get("/api/auth/me")
        .header("authorization", format!("Bearer {}", new_token))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_auth_me(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "me@example.com",
        "password",
    )
    .await?;
    attach_role_with_permissions(
        &mut db,
        &test_user.user.id,
        "hr",
        false,
        &["leaves.view", "leaves.decide"],
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/auth/me")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect: roles and the resolved capability codes
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("email").string(), "me@example.com");
    assert_eq!(data.object().get("roles").array().len(), 1);
    let permissions: Vec<String> = data.object().get("permissions").deserialize();
    assert_eq!(
        permissions,
        vec!["leaves.decide".to_string(), "leaves.view".to_string()]
    );
    Ok(())
}
