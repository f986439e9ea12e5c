use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        role_user::TABLE_NAME as ROLE_USER_TABLE_NAME,
        user::{User, TABLE_NAME},
    },
};

pub async fn paginate_user(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    limit: u32,
    exclude_user_id: Option<&Uuid>,
) -> anyhow::Result<(Vec<User>, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["deleted_date IS NULL".to_string()];

    if let Some(id) = exclude_user_id {
        binds.push(SqlxBinds::Uuid(*id));
        filters.push(format!("id != ${}", binds.len()));
    }

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

    let q = binds_query_as::<User>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    Ok((data, count.0 as u32))
}

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
    exclude_soft_delete: Option<bool>,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let mut filters: Vec<String> = vec!["id = $1".to_string()];
    if exclude_soft_delete.unwrap_or(true) {
        filters.push("deleted_date IS NULL".to_string());
    }
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<User>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_user_by_email(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(email.to_string())];
    let filters: Vec<String> = vec!["email = $1".to_string(), "deleted_date IS NULL".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<User>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_user(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    phone: Option<String>,
    avatar: Option<String>,
    email: String,
    password_hash: String,
    request_user_id: Option<Uuid>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<User> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_user = User {
        id: id.unwrap_or(Uuid::now_v7()),
        first_name,
        middle_name,
        last_name,
        phone,
        avatar,
        email,
        password: password_hash,
        created_by: request_user_id,
        updated_by: request_user_id,
        created_date: Some(now),
        updated_date: Some(now),
        deleted_date: None,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, first_name, middle_name, last_name, phone, avatar, email, password,
    created_by, updated_by, created_date, updated_date, deleted_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_user.id)
    .bind(&new_user.first_name)
    .bind(&new_user.middle_name)
    .bind(&new_user.last_name)
    .bind(&new_user.phone)
    .bind(&new_user.avatar)
    .bind(&new_user.email)
    .bind(&new_user.password)
    .bind(new_user.created_by)
    .bind(new_user.updated_by)
    .bind(new_user.created_date)
    .bind(new_user.updated_date)
    .bind(new_user.deleted_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_user)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    phone: Option<String>,
    avatar: Option<String>,
    email: String,
    password_hash: Option<String>,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    user.first_name = first_name;
    user.middle_name = middle_name;
    user.last_name = last_name;
    user.phone = phone;
    user.avatar = avatar;
    user.email = email;
    if let Some(password_hash) = password_hash {
        user.password = password_hash;
    }
    user.updated_by = Some(request_user.id);
    user.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET first_name = $1, middle_name = $2, last_name = $3, phone = $4, avatar = $5,
        email = $6, password = $7, updated_by = $8, updated_date = $9
        WHERE id = $10"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.first_name)
    .bind(&user.middle_name)
    .bind(&user.last_name)
    .bind(&user.phone)
    .bind(&user.avatar)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.updated_by)
    .bind(user.updated_date)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn soft_delete_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    user.updated_by = Some(request_user.id);
    user.updated_date = Some(now);
    user.deleted_date = Some(now);
    sqlx::query(
        format!(
            r#"UPDATE {}
    SET updated_by = $1, updated_date = $2, deleted_date = $3
    WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.updated_by)
    .bind(user.updated_date)
    .bind(user.deleted_date)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn attach_roles(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    role_ids: &[Uuid],
) -> anyhow::Result<()> {
    for role_id in role_ids {
        sqlx::query(
            format!(
                "INSERT INTO {} (role_id, user_id) VALUES ($1, $2)",
                ROLE_USER_TABLE_NAME
            )
            .as_str(),
        )
        .bind(role_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Replace the user's role assignments with exactly the given set.
pub async fn sync_roles(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    role_ids: &[Uuid],
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE user_id = $1", ROLE_USER_TABLE_NAME).as_str())
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    attach_roles(tx, user_id, role_ids).await?;
    Ok(())
}
