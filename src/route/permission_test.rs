use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use sqlx::PgPool;

use crate::{
    cli::db::db_seed_permissions,
    core::test_utils::{generate_test_superuser, generate_test_user},
    init_openapi_route,
    repository::permission::PERMISSION_CATALOG,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_paginate_permission_api(pool: PgPool) -> anyhow::Result<()> {
    // Given: the seeded catalog
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    db_seed_permissions(&app_state.db).await?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let admin = generate_test_superuser(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "admin@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/permissions")
        .query("limit", &50)
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(
        data.object().get("meta").object().get("total_rows").i64(),
        PERMISSION_CATALOG.len() as i64
    );
    assert_eq!(
        data.object().get("rows").array().len(),
        PERMISSION_CATALOG.len()
    );

    // permission listing itself is gated
    let outsider = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "outsider@example.com",
        "password",
    )
    .await?;
    let resp = cli
        .get("/api/permissions")
        .header("authorization", format!("Bearer {}", outsider.token))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
    Ok(())
}
