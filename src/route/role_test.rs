use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::{attach_role_with_permissions, generate_test_superuser, generate_test_user},
    factory::permission::PermissionFactory,
    init_openapi_route,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_create_and_update_role_api(pool: PgPool) -> anyhow::Result<()> {
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
    let permissions = PermissionFactory::new().generate_many(&app_state.db, 3, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: create with two attached permissions
    let resp = cli
        .post("/api/roles")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "name": "hr_manager",
            "description": "manages leave",
            "permissions": [
                permissions[0].id.to_string(),
                permissions[1].id.to_string(),
            ]
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    let role_id: Uuid = data.object().get("id").deserialize();
    assert_eq!(data.object().get("permissions").array().len(), 2);
    assert!(!data.object().get("is_superuser").bool());

    // When 2: sync down to a single permission
    let resp = cli
        .put(format!("/api/roles/{}", role_id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "description": "updated",
            "permissions": [permissions[2].id.to_string()]
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status_is_ok();
    let attached: (i64,) =
        sqlx::query_as("SELECT count(permission_id) FROM public.role_permission WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(attached.0, 1);

    // When 3: unknown permission id
    let resp = cli
        .post("/api/roles")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "name": "broken",
            "permissions": [Uuid::now_v7().to_string()]
        }))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[sqlx::test]
async fn test_delete_role_api_refuses_assigned(pool: PgPool) -> anyhow::Result<()> {
    // Given: a role assigned to a user
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
    let member = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "member@example.com",
        "password",
    )
    .await?;
    let role = attach_role_with_permissions(
        &mut db,
        &member.user.id,
        "clerk",
        false,
        &["leaves.view"],
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: delete while assigned
    let resp = cli
        .delete(format!("/api/roles/{}", role.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // When 2: unassign then delete
    sqlx::query("DELETE FROM public.role_user WHERE role_id = $1")
        .bind(role.id)
        .execute(&app_state.db)
        .await?;
    let resp = cli
        .delete(format!("/api/roles/{}", role.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 2: role and its attachments are gone
    resp.assert_status_is_ok();
    let gone: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM public.roles WHERE id = $1")
        .bind(role.id)
        .fetch_optional(&app_state.db)
        .await?;
    assert!(gone.is_none());
    let attachments: (i64,) =
        sqlx::query_as("SELECT count(permission_id) FROM public.role_permission WHERE role_id = $1")
            .bind(role.id)
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(attachments.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_role_api_authorization(pool: PgPool) -> anyhow::Result<()> {
    // Given: a user with roles.view only and a superuser
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
    attach_role_with_permissions(&mut db, &viewer.user.id, "auditor", false, &["roles.view"])
        .await?;
    let superuser = generate_test_superuser(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "root@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When / Expect: the viewer reads but cannot create
    let resp = cli
        .get("/api/roles")
        .header("authorization", format!("Bearer {}", viewer.token))
        .send()
        .await;
    resp.assert_status_is_ok();

    let resp = cli
        .post("/api/roles")
        .header("authorization", format!("Bearer {}", viewer.token))
        .body_json(&json!({"name": "nope"}))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    // the superuser bypasses explicit attachments entirely
    let resp = cli
        .post("/api/roles")
        .header("authorization", format!("Bearer {}", superuser.token))
        .body_json(&json!({"name": "allowed"}))
        .send()
        .await;
    resp.assert_status_is_ok();
    Ok(())
}
