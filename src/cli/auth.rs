use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{core::security::hash_password, repository};

/// Bootstrap an administrator: a user plus a fresh superuser role.
pub async fn create_superuser(pool: &PgPool, email: &str, password: &str) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    let hashed_password = hash_password(password).unwrap();
    let now = Local::now().fixed_offset();
    let user = repository::user::create_user(
        &mut tx,
        Some(Uuid::now_v7()),
        "Admin".to_string(),
        None,
        "User".to_string(),
        None,
        None,
        email.to_string(),
        hashed_password,
        None,
        Some(now),
    )
    .await?;

    let role = repository::role::create_role(
        &mut tx,
        None,
        "superuser".to_string(),
        Some("Bootstrap superuser role".to_string()),
        true,
        &user,
        Some(now),
    )
    .await?;
    repository::user::attach_roles(&mut tx, &user.id, &[role.id]).await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::cli::auth::create_superuser;

    #[sqlx::test]
    async fn test_create_superuser(pool: PgPool) -> anyhow::Result<()> {
        // When
        create_superuser(&pool, "admin@example.com", "adminpassword").await?;

        // Expect
        let db_res: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT email
            FROM public.users
            WHERE email = $1
            "#,
        )
        .bind("admin@example.com")
        .fetch_optional(&pool)
        .await?;
        assert!(db_res.is_some());

        let superuser: (bool,) = sqlx::query_as(
            r#"
            SELECT r.is_superuser
            FROM public.roles r
            JOIN public.role_user ru ON ru.role_id = r.id
            JOIN public.users u ON u.id = ru.user_id
            WHERE u.email = $1
            "#,
        )
        .bind("admin@example.com")
        .fetch_one(&pool)
        .await?;
        assert!(superuser.0);
        Ok(())
    }
}
