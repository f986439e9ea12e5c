use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::{attach_role_with_permissions, generate_test_superuser, generate_test_user},
    factory::{leave::LeaveFactory, leave_policy::LeavePolicyFactory, leave_type::LeaveTypeFactory},
    init_openapi_route,
    model::{leave::Leave, leave::LeaveStatus, leave_policy::LeavePolicy},
    settings::get_config,
    AppState,
};

#[derive(Clone)]
struct PolicyExt {
    user_id: Uuid,
    leave_type_id: Uuid,
    total_days: i32,
    remaining_days: i32,
}

async fn seed_policy(
    app_state: &Arc<AppState>,
    user_id: Uuid,
    leave_type_id: Uuid,
    total_days: i32,
    remaining_days: i32,
) -> anyhow::Result<LeavePolicy> {
    let mut policy_factory = LeavePolicyFactory::<PolicyExt>::new();
    policy_factory.modified_one(|data, ext| LeavePolicy {
        id: data.id,
        user_id: ext.user_id,
        leave_type_id: ext.leave_type_id,
        policy_name: None,
        total_days: ext.total_days,
        remaining_days: ext.remaining_days,
        created_by: None,
        updated_by: None,
        created_date: data.created_date,
        updated_date: data.updated_date,
    });
    let policy = policy_factory
        .generate_one(
            &app_state.db,
            PolicyExt {
                user_id,
                leave_type_id,
                total_days,
                remaining_days,
            },
        )
        .await?;
    Ok(policy)
}

#[derive(Clone)]
struct LeaveExt {
    user_id: Uuid,
    leave_type_id: Uuid,
    total_days: i32,
}

async fn seed_pending_leave(
    app_state: &Arc<AppState>,
    user_id: Uuid,
    leave_type_id: Uuid,
    total_days: i32,
) -> anyhow::Result<Leave> {
    let mut leave_factory = LeaveFactory::<LeaveExt>::new();
    leave_factory.modified_one(|data, ext| Leave {
        id: data.id,
        user_id: ext.user_id,
        leave_type_id: ext.leave_type_id,
        from_date: data.from_date,
        to_date: data.from_date + chrono::Duration::days(ext.total_days as i64 - 1),
        total_days: ext.total_days,
        reason: data.reason.clone(),
        status: LeaveStatus::Pending.as_str().to_string(),
        approved_by: None,
        created_by: None,
        updated_by: None,
        created_date: data.created_date,
        updated_date: data.updated_date,
    });
    let leave = leave_factory
        .generate_one(
            &app_state.db,
            LeaveExt {
                user_id,
                leave_type_id,
                total_days,
            },
        )
        .await?;
    Ok(leave)
}

async fn remaining_days(db: &PgPool, policy_id: Uuid) -> anyhow::Result<i32> {
    let row: (i32,) =
        sqlx::query_as("SELECT remaining_days FROM public.leave_policies WHERE id = $1")
            .bind(policy_id)
            .fetch_one(db)
            .await?;
    Ok(row.0)
}

async fn leave_status(db: &PgPool, leave_id: Uuid) -> anyhow::Result<String> {
    let row: (String,) = sqlx::query_as("SELECT status FROM public.leaves WHERE id = $1")
        .bind(leave_id)
        .fetch_one(db)
        .await?;
    Ok(row.0)
}

#[sqlx::test]
async fn test_create_leave_api(pool: PgPool) -> anyhow::Result<()> {
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
    let policy = seed_policy(&app_state, admin.user.id, leave_type.id, 10, 10).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: valid three day request
    let resp = cli
        .post("/api/leaves")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "user_id": admin.user.id.to_string(),
            "leave_type_id": leave_type.id.to_string(),
            "from_date": "2025-01-01",
            "to_date": "2025-01-03",
            "reason": "family visit"
        }))
        .send()
        .await;

    // Expect 1: pending leave, no reservation yet
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("status").string(), "pending");
    assert_eq!(data.object().get("total_days").i64(), 3);
    assert_eq!(remaining_days(&app_state.db, policy.id).await?, 10);

    // When 2: inverted date range
    let resp = cli
        .post("/api/leaves")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "user_id": admin.user.id.to_string(),
            "leave_type_id": leave_type.id.to_string(),
            "from_date": "2025-01-03",
            "to_date": "2025-01-01",
            "reason": "family visit"
        }))
        .send()
        .await;

    // Expect 2: validation error
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // When 3: no policy for this leave type
    let other_type = LeaveTypeFactory::new().generate_one(&app_state.db, ()).await?;
    let resp = cli
        .post("/api/leaves")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "user_id": admin.user.id.to_string(),
            "leave_type_id": other_type.id.to_string(),
            "from_date": "2025-01-01",
            "to_date": "2025-01-03",
        }))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[sqlx::test]
async fn test_approve_reserves_balance_and_blocks_overdraw(pool: PgPool) -> anyhow::Result<()> {
    // Given: policy 10/10 and a pending three day leave
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
    let policy = seed_policy(&app_state, admin.user.id, leave_type.id, 10, 10).await?;
    let leave = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 3).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: approve
    let resp = cli
        .post(format!("/api/leaves/{}/decide", leave.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"action": "approved"}))
        .send()
        .await;

    // Expect 1: approved and balance drawn down
    resp.assert_status_is_ok();
    assert_eq!(leave_status(&app_state.db, leave.id).await?, "approved");
    assert_eq!(remaining_days(&app_state.db, policy.id).await?, 7);

    // When 2: an eight day request no longer fits the remaining seven
    let resp = cli
        .post("/api/leaves")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "user_id": admin.user.id.to_string(),
            "leave_type_id": leave_type.id.to_string(),
            "from_date": "2025-02-01",
            "to_date": "2025-02-08",
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(remaining_days(&app_state.db, policy.id).await?, 7);
    Ok(())
}

#[sqlx::test]
async fn test_reject_never_touches_ledger(pool: PgPool) -> anyhow::Result<()> {
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
    let policy = seed_policy(&app_state, admin.user.id, leave_type.id, 10, 10).await?;
    let leave = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 4).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post(format!("/api/leaves/{}/decide", leave.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"action": "rejected"}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    assert_eq!(leave_status(&app_state.db, leave.id).await?, "rejected");
    assert_eq!(remaining_days(&app_state.db, policy.id).await?, 10);
    Ok(())
}

#[sqlx::test]
async fn test_second_decide_fails_and_keeps_ledger(pool: PgPool) -> anyhow::Result<()> {
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
    let policy = seed_policy(&app_state, admin.user.id, leave_type.id, 10, 10).await?;
    let leave = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 3).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    let resp = cli
        .post(format!("/api/leaves/{}/decide", leave.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"action": "approved"}))
        .send()
        .await;
    resp.assert_status_is_ok();

    // When: approving again, then rejecting the decided leave
    let resp = cli
        .post(format!("/api/leaves/{}/decide", leave.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"action": "approved"}))
        .send()
        .await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let resp = cli
        .post(format!("/api/leaves/{}/decide", leave.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"action": "rejected"}))
        .send()
        .await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // Expect: one deduction only
    assert_eq!(leave_status(&app_state.db, leave.id).await?, "approved");
    assert_eq!(remaining_days(&app_state.db, policy.id).await?, 7);
    Ok(())
}

#[sqlx::test]
async fn test_concurrent_approvals_overdraw_exactly_once(pool: PgPool) -> anyhow::Result<()> {
    // Given: remaining 10, two pending six day leaves against the same policy
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
    let policy = seed_policy(&app_state, admin.user.id, leave_type.id, 10, 10).await?;
    let first = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 6).await?;
    let second = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 6).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When: both approvals race
    let (resp_a, resp_b) = tokio::join!(
        cli.post(format!("/api/leaves/{}/decide", first.id))
            .header("authorization", format!("Bearer {}", admin.token))
            .body_json(&json!({"action": "approved"}))
            .send(),
        cli.post(format!("/api/leaves/{}/decide", second.id))
            .header("authorization", format!("Bearer {}", admin.token))
            .body_json(&json!({"action": "approved"}))
            .send(),
    );

    // Expect: exactly one wins, the loser sees insufficient balance, and
    // the ledger reflects a single deduction
    let first_status = leave_status(&app_state.db, first.id).await?;
    let second_status = leave_status(&app_state.db, second.id).await?;
    let mut outcomes = vec![first_status.as_str(), second_status.as_str()];
    outcomes.sort();
    assert_eq!(outcomes, vec!["approved", "pending"]);
    if first_status == "approved" {
        resp_a.assert_status_is_ok();
        resp_b.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    } else {
        resp_b.assert_status_is_ok();
        resp_a.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
    assert_eq!(remaining_days(&app_state.db, policy.id).await?, 4);
    Ok(())
}

#[sqlx::test]
async fn test_update_leave_api(pool: PgPool) -> anyhow::Result<()> {
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
    seed_policy(&app_state, admin.user.id, leave_type.id, 10, 10).await?;
    let leave = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 3).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: stretch the pending leave to five days
    let resp = cli
        .put(format!("/api/leaves/{}", leave.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "leave_type_id": leave_type.id.to_string(),
            "from_date": "2025-03-01",
            "to_date": "2025-03-05",
            "reason": "extended"
        }))
        .send()
        .await;

    // Expect 1: span recomputed
    resp.assert_status_is_ok();
    let total_days: (i32,) = sqlx::query_as("SELECT total_days FROM public.leaves WHERE id = $1")
        .bind(leave.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(total_days.0, 5);

    // When 2: stretch past the remaining balance
    let resp = cli
        .put(format!("/api/leaves/{}", leave.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "leave_type_id": leave_type.id.to_string(),
            "from_date": "2025-03-01",
            "to_date": "2025-03-12",
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // When 3: decided leaves refuse edits
    let decided = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 2).await?;
    let resp = cli
        .post(format!("/api/leaves/{}/decide", decided.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"action": "rejected"}))
        .send()
        .await;
    resp.assert_status_is_ok();
    let resp = cli
        .put(format!("/api/leaves/{}", decided.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "leave_type_id": leave_type.id.to_string(),
            "from_date": "2025-03-01",
            "to_date": "2025-03-02",
        }))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[sqlx::test]
async fn test_delete_leave_api(pool: PgPool) -> anyhow::Result<()> {
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
    let policy = seed_policy(&app_state, admin.user.id, leave_type.id, 10, 10).await?;
    let pending = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 3).await?;
    let approved = seed_pending_leave(&app_state, admin.user.id, leave_type.id, 2).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    let resp = cli
        .post(format!("/api/leaves/{}/decide", approved.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"action": "approved"}))
        .send()
        .await;
    resp.assert_status_is_ok();

    // When 1: delete the pending leave
    let resp = cli
        .delete(format!("/api/leaves/{}", pending.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 1: row gone, ledger untouched
    resp.assert_status_is_ok();
    let gone: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM public.leaves WHERE id = $1")
        .bind(pending.id)
        .fetch_optional(&app_state.db)
        .await?;
    assert!(gone.is_none());
    assert_eq!(remaining_days(&app_state.db, policy.id).await?, 8);

    // When 2: delete the approved leave
    let resp = cli
        .delete(format!("/api/leaves/{}", approved.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 2: refused, still approved, still reserved
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(leave_status(&app_state.db, approved.id).await?, "approved");
    assert_eq!(remaining_days(&app_state.db, policy.id).await?, 8);
    Ok(())
}

#[sqlx::test]
async fn test_leave_capability_gates(pool: PgPool) -> anyhow::Result<()> {
    // Given: a viewer holding only leaves.view
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
    let viewer = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "viewer@example.com",
        "password",
    )
    .await?;
    attach_role_with_permissions(&mut db, &viewer.user.id, "viewer", false, &["leaves.view"])
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When: listing accepts ANY of view/decide, decide demands the
    // decide capability
    let resp = cli
        .get("/api/leaves")
        .header("authorization", format!("Bearer {}", viewer.token))
        .send()
        .await;
    resp.assert_status_is_ok();

    let resp = cli
        .post(format!("/api/leaves/{}/decide", Uuid::now_v7()))
        .header("authorization", format!("Bearer {}", viewer.token))
        .body_json(&json!({"action": "approved"}))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    // and no token at all is unauthenticated, not forbidden
    let resp = cli.get("/api/leaves").send().await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}
