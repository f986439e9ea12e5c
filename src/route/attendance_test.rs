use std::sync::Arc;

use chrono::NaiveDate;
use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_user,
    factory::attendance::AttendanceFactory,
    init_openapi_route,
    model::attendance::Attendance,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_punch_in_and_out_api(pool: PgPool) -> anyhow::Result<()> {
    // Given: a plain authenticated user, no capabilities needed
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
    let worker = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "worker@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: nothing punched yet
    let resp = cli
        .get("/api/attendance/check-attendance")
        .header("authorization", format!("Bearer {}", worker.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status(StatusCode::NOT_FOUND);

    // When 2: punch in
    let resp = cli
        .post("/api/attendance/punch-in")
        .header("authorization", format!("Bearer {}", worker.token))
        .body_json(&json!({"in_note": "morning shift"}))
        .send()
        .await;

    // Expect 2
    resp.assert_status_is_ok();

    // When 3: a second punch in the same day
    let resp = cli
        .post("/api/attendance/punch-in")
        .header("authorization", format!("Bearer {}", worker.token))
        .body_json(&json!({}))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When 4: punch out
    let resp = cli
        .post("/api/attendance/punch-out")
        .header("authorization", format!("Bearer {}", worker.token))
        .body_json(&json!({"out_note": "done"}))
        .send()
        .await;

    // Expect 4: clock_out recorded on today's row
    resp.assert_status_is_ok();
    let row: (Option<chrono::DateTime<chrono::FixedOffset>>, Option<String>) = sqlx::query_as(
        "SELECT clock_out, out_note FROM public.attendances WHERE user_id = $1",
    )
    .bind(worker.user.id)
    .fetch_one(&app_state.db)
    .await?;
    assert!(row.0.is_some());
    assert_eq!(row.1, Some("done".to_string()));

    // and check-attendance now finds it
    let resp = cli
        .get("/api/attendance/check-attendance")
        .header("authorization", format!("Bearer {}", worker.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    Ok(())
}

#[sqlx::test]
async fn test_punch_out_without_punch_in(pool: PgPool) -> anyhow::Result<()> {
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
    let worker = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "worker@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/attendance/punch-out")
        .header("authorization", format!("Bearer {}", worker.token))
        .body_json(&json!({}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_paginate_attendance_api(pool: PgPool) -> anyhow::Result<()> {
    // Given: two rows for the worker, two for other users
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
    let worker = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "worker@example.com",
        "password",
    )
    .await?;
    let mut attendance_factory = AttendanceFactory::<Uuid>::new();
    attendance_factory.modified_many(|data, idx, worker_id| Attendance {
        id: data.id,
        user_id: if idx < 2 { worker_id } else { data.user_id },
        date: NaiveDate::from_ymd_opt(2025, 6, idx as u32 + 1).unwrap(),
        clock_in: data.clock_in,
        clock_out: None,
        in_note: data.in_note.clone(),
        out_note: None,
        created_date: data.created_date,
        updated_date: data.updated_date,
    });
    attendance_factory
        .generate_many(&app_state.db, 4, worker.user.id)
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: unfiltered
    let resp = cli
        .get("/api/attendance")
        .header("authorization", format!("Bearer {}", worker.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("meta").object().get("total_rows").i64(), 4);

    // When 2: filtered to the worker
    let resp = cli
        .get("/api/attendance")
        .query("user_id", &worker.user.id.to_string())
        .header("authorization", format!("Bearer {}", worker.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("meta").object().get("total_rows").i64(), 2);
    Ok(())
}
