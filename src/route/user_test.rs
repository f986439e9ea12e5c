use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_superuser,
    factory::role::RoleFactory,
    init_openapi_route,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_create_user_api(pool: PgPool) -> anyhow::Result<()> {
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
    let role = RoleFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1
    let resp = cli
        .post("/api/users")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "password": "supersecret",
            "roles": [role.id.to_string()]
        }))
        .send()
        .await;

    // Expect 1: created with the role attached and the password hashed
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("email").string(), "jane@example.com");
    assert_eq!(data.object().get("roles").array().len(), 1);
    let stored: (String,) = sqlx::query_as("SELECT password FROM public.users WHERE email = $1")
        .bind("jane@example.com")
        .fetch_one(&app_state.db)
        .await?;
    assert_ne!(stored.0, "supersecret");

    // When 2: duplicate email
    let resp = cli
        .post("/api/users")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "first_name": "Jane",
            "last_name": "Again",
            "email": "jane@example.com",
            "password": "supersecret",
            "roles": [role.id.to_string()]
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // When 3: no valid roles
    let resp = cli
        .post("/api/users")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "first_name": "John",
            "last_name": "Doe",
            "email": "john@example.com",
            "password": "supersecret",
            "roles": [Uuid::now_v7().to_string()]
        }))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_paginate_user_api_excludes_requester(pool: PgPool) -> anyhow::Result<()> {
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
    crate::factory::user::UserFactory::new()
        .generate_many(&app_state.db, 3, ())
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/users")
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect: the three generated users, not the requester
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let data = body.value().object().get("data");
    assert_eq!(data.object().get("meta").object().get("total_rows").i64(), 3);
    Ok(())
}

#[sqlx::test]
async fn test_update_and_delete_user_api(pool: PgPool) -> anyhow::Result<()> {
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
    let target = crate::factory::user::UserFactory::new()
        .generate_one(&app_state.db, ())
        .await?;
    let roles = RoleFactory::new().generate_many(&app_state.db, 2, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: update fields and sync roles
    let resp = cli
        .put(format!("/api/users/{}", target.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({
            "first_name": "Renamed",
            "last_name": "Person",
            "email": "renamed@example.com",
            "roles": [roles[0].id.to_string(), roles[1].id.to_string()]
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let assigned: (i64,) =
        sqlx::query_as("SELECT count(role_id) FROM public.role_user WHERE user_id = $1")
            .bind(target.id)
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(assigned.0, 2);

    // When 2: soft delete
    let resp = cli
        .delete(format!("/api/users/{}", target.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect 2: row kept, deleted_date set, detail now 404
    resp.assert_status_is_ok();
    let deleted: (Option<chrono::DateTime<chrono::FixedOffset>>,) =
        sqlx::query_as("SELECT deleted_date FROM public.users WHERE id = $1")
            .bind(target.id)
            .fetch_one(&app_state.db)
            .await?;
    assert!(deleted.0.is_some());
    let resp = cli
        .get(format!("/api/users/{}", target.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}
