use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        authorize::PermissionGrant,
        sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    },
    model::{
        permission::{Permission, TABLE_NAME as PERMISSION_TABLE_NAME},
        role::{Role, TABLE_NAME},
        role_permission::TABLE_NAME as ROLE_PERMISSION_TABLE_NAME,
        role_user::TABLE_NAME as ROLE_USER_TABLE_NAME,
        user::User,
    },
};

pub async fn paginate_role(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    limit: u32,
) -> anyhow::Result<(Vec<Role>, u32)> {
    let filters: Vec<String> = vec![];
    let offset = (page - 1) * limit;
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["created_date DESC".to_string()],
        Some(limit),
        Some(offset),
    );
    let stmt_count = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );
    let data = binds_query_as::<Role>(&stmt, vec![]).fetch_all(&mut **tx).await?;
    let count = binds_query_as::<(i64,)>(&stmt_count, vec![])
        .fetch_one(&mut **tx)
        .await?;
    Ok((data, count.0 as u32))
}

pub async fn get_role_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Role>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<Role>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn count_roles_by_ids(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
) -> anyhow::Result<u32> {
    if ids.is_empty() {
        return Ok(0);
    }
    let count: (i64,) = sqlx::query_as(
        format!("SELECT count(id) FROM {} WHERE id = ANY($1)", TABLE_NAME).as_str(),
    )
    .bind(ids)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count.0 as u32)
}

pub async fn create_role(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    name: String,
    description: Option<String>,
    is_superuser: bool,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Role> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_role = Role {
        id: id.unwrap_or(Uuid::now_v7()),
        name,
        description,
        is_superuser,
        created_by: Some(request_user.id),
        updated_by: Some(request_user.id),
        created_date: Some(now),
        updated_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, description, is_superuser, created_by,
    updated_by, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_role.id)
    .bind(&new_role.name)
    .bind(&new_role.description)
    .bind(new_role.is_superuser)
    .bind(new_role.created_by)
    .bind(new_role.updated_by)
    .bind(new_role.created_date)
    .bind(new_role.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_role)
}

pub async fn update_role(
    tx: &mut Transaction<'_, Postgres>,
    role: &mut Role,
    description: Option<String>,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    role.description = description;
    role.updated_by = Some(request_user.id);
    role.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET description = $1, updated_by = $2, updated_date = $3
        WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&role.description)
    .bind(role.updated_by)
    .bind(role.updated_date)
    .bind(role.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_role(tx: &mut Transaction<'_, Postgres>, role: &Role) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            "DELETE FROM {} WHERE role_id = $1",
            ROLE_PERMISSION_TABLE_NAME
        )
        .as_str(),
    )
    .bind(role.id)
    .execute(&mut **tx)
    .await?;
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(role.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn count_users_by_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> anyhow::Result<u32> {
    let count: (i64,) = sqlx::query_as(
        format!(
            "SELECT count(user_id) FROM {} WHERE role_id = $1",
            ROLE_USER_TABLE_NAME
        )
        .as_str(),
    )
    .bind(role_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count.0 as u32)
}

pub async fn attach_permissions(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    permission_ids: &[Uuid],
) -> anyhow::Result<()> {
    for permission_id in permission_ids {
        sqlx::query(
            format!(
                "INSERT INTO {} (role_id, permission_id) VALUES ($1, $2)",
                ROLE_PERMISSION_TABLE_NAME
            )
            .as_str(),
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Replace the role's permission attachments with exactly the given set.
pub async fn sync_permissions(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    permission_ids: &[Uuid],
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            "DELETE FROM {} WHERE role_id = $1",
            ROLE_PERMISSION_TABLE_NAME
        )
        .as_str(),
    )
    .bind(role_id)
    .execute(&mut **tx)
    .await?;
    attach_permissions(tx, role_id, permission_ids).await?;
    Ok(())
}

pub async fn get_permissions_by_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> anyhow::Result<Vec<Permission>> {
    let data = sqlx::query_as(
        format!(
            r#"SELECT p.* FROM {} p
            JOIN {} rp ON rp.permission_id = p.id
            WHERE rp.role_id = $1
            ORDER BY p.code"#,
            PERMISSION_TABLE_NAME, ROLE_PERMISSION_TABLE_NAME
        )
        .as_str(),
    )
    .bind(role_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

pub async fn get_roles_by_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<Role>> {
    let data = sqlx::query_as(
        format!(
            r#"SELECT r.* FROM {} r
            JOIN {} ru ON ru.role_id = r.id
            WHERE ru.user_id = $1
            ORDER BY r.name"#,
            TABLE_NAME, ROLE_USER_TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

/// Resolve the principal's effective permission set. Any assigned superuser
/// role collapses the whole set to `PermissionGrant::All`.
pub async fn get_permission_grant(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<PermissionGrant> {
    let roles = get_roles_by_user(tx, user_id).await?;
    if roles.iter().any(|role| role.is_superuser) {
        return Ok(PermissionGrant::All);
    }
    let codes: Vec<(String,)> = sqlx::query_as(
        format!(
            r#"SELECT DISTINCT p.code FROM {} p
            JOIN {} rp ON rp.permission_id = p.id
            JOIN {} ru ON ru.role_id = rp.role_id
            WHERE ru.user_id = $1"#,
            PERMISSION_TABLE_NAME, ROLE_PERMISSION_TABLE_NAME, ROLE_USER_TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;
    let granted: HashSet<String> = codes.into_iter().map(|row| row.0).collect();
    Ok(PermissionGrant::Codes(granted))
}
