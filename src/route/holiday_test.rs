use std::sync::Arc;

use chrono::NaiveDate;
use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_superuser,
    factory::holiday::HolidayFactory,
    init_openapi_route,
    model::holiday::Holiday,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_holiday_crud_api(pool: PgPool) -> anyhow::Result<()> {
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
        .post("/api/holidays")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "title": "New Year",
            "date": "2026-01-01",
            "description": "first day of the year"
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let holiday_id: Uuid = body
        .value()
        .object()
        .get("data")
        .object()
        .get("id")
        .deserialize();

    // When 2: a second active holiday on the same date
    let resp = cli
        .post("/api/holidays")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"title": "Duplicate", "date": "2026-01-01"}))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When 3: update moves the date
    let resp = cli
        .put(format!("/api/holidays/{}", holiday_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"title": "New Year", "date": "2026-01-02"}))
        .send()
        .await;

    // Expect 3
    resp.assert_status_is_ok();
    let row: (NaiveDate,) = sqlx::query_as("SELECT date FROM public.holidays WHERE id = $1")
        .bind(holiday_id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(row.0, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());

    // When 4: delete
    let resp = cli
        .delete(format!("/api/holidays/{}", holiday_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 4
    resp.assert_status_is_ok();
    let gone: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM public.holidays WHERE id = $1")
        .bind(holiday_id)
        .fetch_optional(&app_state.db)
        .await?;
    assert!(gone.is_none());
    Ok(())
}

#[sqlx::test]
async fn test_paginate_holiday_api_filters_inactive(pool: PgPool) -> anyhow::Result<()> {
    // Given: two active holidays and one disabled
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
    let mut holiday_factory = HolidayFactory::<bool>::new();
    holiday_factory.modified_many(|data, idx, _| Holiday {
        id: data.id,
        title: data.title.clone(),
        description: data.description.clone(),
        date: data.date,
        status: idx != 2,
        created_by: None,
        updated_by: None,
        created_date: data.created_date,
        updated_date: data.updated_date,
    });
    holiday_factory.generate_many(&app_state.db, 3, true).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/holidays")
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect: the disabled one is not listed
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("meta").object().get("total_rows").i64(), 2);
    Ok(())
}
