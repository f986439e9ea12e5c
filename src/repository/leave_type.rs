use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        leave_type::{LeaveType, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_leave_type(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    limit: u32,
) -> anyhow::Result<(Vec<LeaveType>, u32)> {
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
    let data = binds_query_as::<LeaveType>(&stmt, vec![])
        .fetch_all(&mut **tx)
        .await?;
    let count = binds_query_as::<(i64,)>(&stmt_count, vec![])
        .fetch_one(&mut **tx)
        .await?;
    Ok((data, count.0 as u32))
}

pub async fn get_leave_type_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<LeaveType>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<LeaveType>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_leave_type_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> anyhow::Result<Option<LeaveType>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE name = $1", TABLE_NAME).as_str())
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn create_leave_type(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    name: String,
    is_paid: bool,
    description: Option<String>,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<LeaveType> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_leave_type = LeaveType {
        id: id.unwrap_or(Uuid::now_v7()),
        name,
        is_paid,
        description,
        created_by: Some(request_user.id),
        updated_by: Some(request_user.id),
        created_date: Some(now),
        updated_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, is_paid, description, created_by,
    updated_by, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_leave_type.id)
    .bind(&new_leave_type.name)
    .bind(new_leave_type.is_paid)
    .bind(&new_leave_type.description)
    .bind(new_leave_type.created_by)
    .bind(new_leave_type.updated_by)
    .bind(new_leave_type.created_date)
    .bind(new_leave_type.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_leave_type)
}

pub async fn update_leave_type(
    tx: &mut Transaction<'_, Postgres>,
    leave_type: &mut LeaveType,
    name: String,
    is_paid: bool,
    description: Option<String>,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    leave_type.name = name;
    leave_type.is_paid = is_paid;
    leave_type.description = description;
    leave_type.updated_by = Some(request_user.id);
    leave_type.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = $1, is_paid = $2, description = $3, updated_by = $4, updated_date = $5
        WHERE id = $6"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&leave_type.name)
    .bind(leave_type.is_paid)
    .bind(&leave_type.description)
    .bind(leave_type.updated_by)
    .bind(leave_type.updated_date)
    .bind(leave_type.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_leave_type(
    tx: &mut Transaction<'_, Postgres>,
    leave_type: &LeaveType,
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(leave_type.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
