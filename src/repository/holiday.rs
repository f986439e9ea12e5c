use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        holiday::{Holiday, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_holiday(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    limit: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<Holiday>, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["status = true".to_string()];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!(
            "(title ILIKE ${} OR description ILIKE ${})",
            binds.len(),
            binds.len()
        ));
    }

    let offset = (page - 1) * limit;
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["date DESC".to_string()],
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
    let data = binds_query_as::<Holiday>(&stmt, binds.clone())
        .fetch_all(&mut **tx)
        .await?;
    let count = binds_query_as::<(i64,)>(&stmt_count, binds)
        .fetch_one(&mut **tx)
        .await?;
    Ok((data, count.0 as u32))
}

pub async fn get_holiday_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Holiday>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<Holiday>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

/// At most one active holiday may exist per date; `exclude_id` skips the row
/// being updated.
pub async fn get_active_holiday_by_date(
    tx: &mut Transaction<'_, Postgres>,
    date: NaiveDate,
    exclude_id: Option<&Uuid>,
) -> anyhow::Result<Option<Holiday>> {
    let mut binds: Vec<SqlxBinds> = vec![SqlxBinds::Date(date)];
    let mut filters: Vec<String> = vec!["date = $1".to_string(), "status = true".to_string()];
    if let Some(id) = exclude_id {
        binds.push(SqlxBinds::Uuid(*id));
        filters.push(format!("id != ${}", binds.len()));
    }
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<Holiday>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_holiday(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    title: String,
    description: Option<String>,
    date: NaiveDate,
    status: bool,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Holiday> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_holiday = Holiday {
        id: id.unwrap_or(Uuid::now_v7()),
        title,
        description,
        date,
        status,
        created_by: Some(request_user.id),
        updated_by: Some(request_user.id),
        created_date: Some(now),
        updated_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, title, description, date, status, created_by,
    updated_by, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_holiday.id)
    .bind(&new_holiday.title)
    .bind(&new_holiday.description)
    .bind(new_holiday.date)
    .bind(new_holiday.status)
    .bind(new_holiday.created_by)
    .bind(new_holiday.updated_by)
    .bind(new_holiday.created_date)
    .bind(new_holiday.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_holiday)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_holiday(
    tx: &mut Transaction<'_, Postgres>,
    holiday: &mut Holiday,
    title: String,
    description: Option<String>,
    date: NaiveDate,
    status: bool,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    holiday.title = title;
    holiday.description = description;
    holiday.date = date;
    holiday.status = status;
    holiday.updated_by = Some(request_user.id);
    holiday.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET title = $1, description = $2, date = $3, status = $4, updated_by = $5, updated_date = $6
        WHERE id = $7"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&holiday.title)
    .bind(&holiday.description)
    .bind(holiday.date)
    .bind(holiday.status)
    .bind(holiday.updated_by)
    .bind(holiday.updated_date)
    .bind(holiday.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_holiday(
    tx: &mut Transaction<'_, Postgres>,
    holiday: &Holiday,
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(holiday.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
