use chrono::Local;
use redis::ConnectionLike;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;
use uuid::Uuid;

use super::security::{generate_refresh_token_from_user, generate_token_from_user};
use crate::core::security::hash_password;
use crate::core::session::add_session;
use crate::model::role::Role;
use crate::model::user::User;
use crate::settings::Config;

pub struct TestUser {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

/// Insert a user with no roles and open a session for it. Capability-less
/// by construction; pair with `attach_role_with_permissions` as needed.
pub async fn generate_test_user<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: Config,
    email: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    // Prepare user
    let hashed_password = hash_password(password).unwrap();
    let id = Uuid::now_v7();
    let now = Local::now().fixed_offset();
    let user = User {
        id,
        first_name: "Test".to_string(),
        middle_name: None,
        last_name: "User".to_string(),
        phone: None,
        avatar: None,
        email: email.to_string(),
        password: hashed_password,
        created_by: None,
        updated_by: None,
        created_date: Some(now),
        updated_date: Some(now),
        deleted_date: None,
    };

    // create user on db
    sqlx::query(
        r#"
        INSERT INTO public.users (id, first_name, last_name, email, password, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **db)
    .await?;

    // Generate token
    let token = generate_token_from_user(user.clone(), config.clone()).await?;
    let refresh_token = generate_refresh_token_from_user(user.clone(), config.clone()).await?;
    add_session(
        redis_conn,
        &user,
        &config,
        token.clone(),
        refresh_token.clone(),
    )?;

    Ok(TestUser {
        user,
        token,
        refresh_token,
    })
}

/// Wire a fresh role (optionally superuser) carrying the given permission
/// codes onto a user. Permission rows are created on the fly.
pub async fn attach_role_with_permissions(
    db: &mut PoolConnection<Postgres>,
    user_id: &Uuid,
    role_name: &str,
    is_superuser: bool,
    codes: &[&str],
) -> anyhow::Result<Role> {
    let now = Local::now().fixed_offset();
    let role = Role {
        id: Uuid::now_v7(),
        name: role_name.to_string(),
        description: None,
        is_superuser,
        created_by: None,
        updated_by: None,
        created_date: Some(now),
        updated_date: Some(now),
    };
    sqlx::query(
        r#"
        INSERT INTO public.roles (id, name, is_superuser, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(role.id)
    .bind(&role.name)
    .bind(role.is_superuser)
    .bind(role.created_date)
    .bind(role.updated_date)
    .execute(&mut **db)
    .await?;

    for code in codes {
        let permission_id: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO public.permissions (id, code, created_date, updated_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO UPDATE SET updated_date = $4
            RETURNING id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(code)
        .bind(now)
        .bind(now)
        .fetch_one(&mut **db)
        .await?;
        sqlx::query(
            "INSERT INTO public.role_permission (role_id, permission_id) VALUES ($1, $2)",
        )
        .bind(role.id)
        .bind(permission_id.0)
        .execute(&mut **db)
        .await?;
    }

    sqlx::query("INSERT INTO public.role_user (role_id, user_id) VALUES ($1, $2)")
        .bind(role.id)
        .bind(user_id)
        .execute(&mut **db)
        .await?;
    Ok(role)
}

/// Test user holding a superuser role.
pub async fn generate_test_superuser<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: Config,
    email: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    let test_user = generate_test_user(db, redis_conn, config, email, password).await?;
    attach_role_with_permissions(db, &test_user.user.id, "superuser", true, &[]).await?;
    Ok(test_user)
}

#[cfg(test)]
mod tests {
    use sqlx::{Acquire, PgPool};
    use uuid::Uuid;

    use crate::{
        core::{
            authorize::{PermissionGrant, RequiredCapabilities},
            security::get_user_from_token,
            session::get_session,
            test_utils::{attach_role_with_permissions, generate_test_user},
        },
        repository::role::get_permission_grant,
        settings::get_config,
    };

    #[sqlx::test]
    async fn test_generate_test_user(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = get_config();
        let client = redis::Client::open(config.redis_url.clone()).unwrap();
        let mut redis_conn = client.get_connection().unwrap();

        // When
        let mut db = pool.acquire().await?;
        let res = generate_test_user(
            &mut db,
            &mut redis_conn,
            config.clone(),
            "testuser@example.com",
            "testpassword",
        )
        .await?;

        // Expect
        // is user exists on db
        let user: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, email FROM public.users WHERE id = $1")
                .bind(&res.user.id)
                .fetch_optional(&mut *db)
                .await?;
        assert!(user.is_some());

        // is jwt token valid
        let mut tx = db.begin().await?;
        let user_token =
            get_user_from_token(&mut tx, &mut redis_conn, Some(res.token.clone())).await?;
        assert!(user_token.is_some());
        assert_eq!(user_token.unwrap().email, "testuser@example.com".to_string());

        // is user exists on redis
        let session = get_session(&mut redis_conn, res.token)?;
        assert!(session.is_some());
        Ok(())
    }

    #[sqlx::test]
    async fn test_attach_role_with_permissions(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = get_config();
        let client = redis::Client::open(config.redis_url.clone()).unwrap();
        let mut redis_conn = client.get_connection().unwrap();
        let mut db = pool.acquire().await?;
        let res = generate_test_user(
            &mut db,
            &mut redis_conn,
            config.clone(),
            "approver@example.com",
            "testpassword",
        )
        .await?;

        // When
        attach_role_with_permissions(
            &mut db,
            &res.user.id,
            "approver",
            false,
            &["leaves.view", "leaves.decide"],
        )
        .await?;

        // Expect
        let mut tx = db.begin().await?;
        let grant = get_permission_grant(&mut tx, &res.user.id).await?;
        assert!(matches!(grant, PermissionGrant::Codes(_)));
        assert!(grant.allows(&RequiredCapabilities::all(&["leaves.decide"])));
        assert!(!grant.allows(&RequiredCapabilities::all(&["leaves.delete"])));
        Ok(())
    }
}
