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
async fn test_create_leave_policy_api(pool: PgPool) -> anyhow::Result<()> {
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
    let leave_type = LeaveTypeFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: remaining omitted defaults to the allotment
    let resp = cli
        .post("/api/leave-policies")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "user_id": admin.user.id.to_string(),
            "leave_type_id": leave_type.id.to_string(),
            "policy_name": "annual",
            "total_days": 12
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("total_days").i64(), 12);
    assert_eq!(data.object().get("remaining_days").i64(), 12);

    // When 2: a second policy for the same pair
    let resp = cli
        .post("/api/leave-policies")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "user_id": admin.user.id.to_string(),
            "leave_type_id": leave_type.id.to_string(),
            "total_days": 5
        }))
        .send()
        .await;

    // Expect 2: the (user, leave type) pair is unique
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // When 3: unknown user
    let resp = cli
        .post("/api/leave-policies")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "user_id": Uuid::now_v7().to_string(),
            "leave_type_id": leave_type.id.to_string(),
            "total_days": 5
        }))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[sqlx::test]
async fn test_update_and_delete_leave_policy_api(pool: PgPool) -> anyhow::Result<()> {
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
    let leave_type = LeaveTypeFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    let resp = cli
        .post("/api/leave-policies")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "user_id": admin.user.id.to_string(),
            "leave_type_id": leave_type.id.to_string(),
            "total_days": 10,
            "remaining_days": 4
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let policy_id: Uuid = body
        .value()
        .object()
        .get("data")
        .object()
        .get("id")
        .deserialize();

    // When 1: raise the allotment without an explicit remaining balance
    let resp = cli
        .put(format!("/api/leave-policies/{}", policy_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"total_days": 15}))
        .send()
        .await;

    // Expect 1: balance reset to the new allotment
    resp.assert_status_is_ok();
    let row: (i32, i32) =
        sqlx::query_as("SELECT total_days, remaining_days FROM public.leave_policies WHERE id = $1")
            .bind(policy_id)
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(row, (15, 15));

    // When 2: delete
    let resp = cli
        .delete(format!("/api/leave-policies/{}", policy_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status_is_ok();
    let gone: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM public.leave_policies WHERE id = $1")
            .bind(policy_id)
            .fetch_optional(&app_state.db)
            .await?;
    assert!(gone.is_none());

    // When 3: operations on the deleted policy
    let resp = cli
        .get(format!("/api/leave-policies/{}", policy_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}
