use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_superuser,
    factory::leave_type::LeaveTypeFactory,
    init_openapi_route,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_leave_type_crud_api(pool: PgPool) -> anyhow::Result<()> {
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

    // When 1: create
    let resp = cli
        .post("/api/leave-types")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "name": "Sick Leave",
            "is_paid": true,
            "description": "paid sick days"
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let leave_type_id: Uuid = body
        .value()
        .object()
        .get("data")
        .object()
        .get("id")
        .deserialize();

    // When 2: duplicate name
    let resp = cli
        .post("/api/leave-types")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"name": "Sick Leave", "is_paid": false}))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // When 3: update
    let resp = cli
        .put(format!("/api/leave-types/{}", leave_type_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"name": "Sick Leave", "is_paid": false}))
        .send()
        .await;

    // Expect 3
    resp.assert_status_is_ok();
    let row: (bool,) = sqlx::query_as("SELECT is_paid FROM public.leave_types WHERE id = $1")
        .bind(leave_type_id)
        .fetch_one(&app_state.db)
        .await?;
    assert!(!row.0);

    // When 4: delete, then fetch
    let resp = cli
        .delete(format!("/api/leave-types/{}", leave_type_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let resp = cli
        .get(format!("/api/leave-types/{}", leave_type_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 4
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_paginate_leave_type_api(pool: PgPool) -> anyhow::Result<()> {
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
    let admin = generate_test_superuser(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "admin@example.com",
        "password",
    )
    .await?;
    LeaveTypeFactory::new().generate_many(&app_state.db, 7, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/leave-types")
        .query("page", &1)
        .query("limit", &5)
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("meta").object().get("total_rows").i64(), 7);
    assert_eq!(data.object().get("rows").array().len(), 5);
    Ok(())
}
