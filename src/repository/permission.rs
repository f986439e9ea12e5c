use chrono::Local;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder},
    model::permission::{Permission, TABLE_NAME},
};

/// Grantable capability catalog installed by the seeding CLI.
pub const PERMISSION_CATALOG: &[(&str, &str)] = &[
    ("users.create", "Can create users"),
    ("users.view", "Can view users and user list"),
    ("users.update", "Can update users"),
    ("users.delete", "Can delete users"),
    ("roles.create", "Can create roles"),
    ("roles.view", "Can view roles and role list"),
    ("roles.update", "Can update roles"),
    ("roles.delete", "Can delete roles"),
    ("permissions.view", "Can view permissions and permissions list"),
    ("holidays.create", "Can create holidays"),
    ("holidays.view", "Can view holidays and holiday list"),
    ("holidays.update", "Can update holidays"),
    ("holidays.delete", "Can delete holidays"),
    ("leaves.create", "Can create leaves"),
    ("leaves.decide", "Can decide leaves"),
    ("leaves.view", "Can view leaves and leaves list"),
    ("leaves.update", "Can update leaves"),
    ("leaves.delete", "Can delete leaves"),
];

pub async fn paginate_permission(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    limit: u32,
) -> anyhow::Result<(Vec<Permission>, u32)> {
    let filters: Vec<String> = vec![];
    let offset = (page - 1) * limit;
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["code ASC".to_string()],
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
    let data = binds_query_as::<Permission>(&stmt, vec![])
        .fetch_all(&mut **tx)
        .await?;
    let count = binds_query_as::<(i64,)>(&stmt_count, vec![])
        .fetch_one(&mut **tx)
        .await?;
    Ok((data, count.0 as u32))
}

pub async fn count_permissions_by_ids(
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

pub async fn get_permission_by_code(
    tx: &mut Transaction<'_, Postgres>,
    code: &str,
) -> anyhow::Result<Option<Permission>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE code = $1", TABLE_NAME).as_str())
        .bind(code)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

/// Insert or refresh one catalog entry, keyed by code.
pub async fn upsert_permission(
    tx: &mut Transaction<'_, Postgres>,
    code: &str,
    description: &str,
) -> anyhow::Result<()> {
    let now = Local::now().fixed_offset();
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, code, description, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (code) DO UPDATE SET description = $3, updated_date = $5"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(Uuid::now_v7())
    .bind(code)
    .bind(description)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
