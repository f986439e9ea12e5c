use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        leave::{Leave, LeaveStatus, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_leave(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    limit: u32,
    user_id: Option<Uuid>,
    status: Option<String>,
) -> anyhow::Result<(Vec<Leave>, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(user_id) = user_id {
        binds.push(SqlxBinds::Uuid(user_id));
        filters.push(format!("user_id = ${}", binds.len()));
    }
    if let Some(status) = status {
        binds.push(SqlxBinds::String(status));
        filters.push(format!("status = ${}", binds.len()));
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
    let data = binds_query_as::<Leave>(&stmt, binds.clone())
        .fetch_all(&mut **tx)
        .await?;
    let count = binds_query_as::<(i64,)>(&stmt_count, binds)
        .fetch_one(&mut **tx)
        .await?;
    Ok((data, count.0 as u32))
}

pub async fn get_leave_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Leave>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<Leave>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_leave(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    user_id: Uuid,
    leave_type_id: Uuid,
    from_date: NaiveDate,
    to_date: NaiveDate,
    total_days: i32,
    reason: Option<String>,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Leave> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_leave = Leave {
        id: id.unwrap_or(Uuid::now_v7()),
        user_id,
        leave_type_id,
        from_date,
        to_date,
        total_days,
        reason,
        status: LeaveStatus::Pending.as_str().to_string(),
        approved_by: None,
        created_by: Some(request_user.id),
        updated_by: Some(request_user.id),
        created_date: Some(now),
        updated_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_id, leave_type_id, from_date, to_date, total_days, reason,
    status, approved_by, created_by, updated_by, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_leave.id)
    .bind(new_leave.user_id)
    .bind(new_leave.leave_type_id)
    .bind(new_leave.from_date)
    .bind(new_leave.to_date)
    .bind(new_leave.total_days)
    .bind(&new_leave.reason)
    .bind(&new_leave.status)
    .bind(new_leave.approved_by)
    .bind(new_leave.created_by)
    .bind(new_leave.updated_by)
    .bind(new_leave.created_date)
    .bind(new_leave.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_leave)
}

/// Rewrite the request fields of a pending leave. `total_days` is the
/// caller's recomputed span; status and approver are untouched here.
#[allow(clippy::too_many_arguments)]
pub async fn update_leave(
    tx: &mut Transaction<'_, Postgres>,
    leave: &mut Leave,
    leave_type_id: Uuid,
    from_date: NaiveDate,
    to_date: NaiveDate,
    total_days: i32,
    reason: Option<String>,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    leave.leave_type_id = leave_type_id;
    leave.from_date = from_date;
    leave.to_date = to_date;
    leave.total_days = total_days;
    leave.reason = reason;
    leave.updated_by = Some(request_user.id);
    leave.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET leave_type_id = $1, from_date = $2, to_date = $3, total_days = $4, reason = $5,
        updated_by = $6, updated_date = $7
        WHERE id = $8"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(leave.leave_type_id)
    .bind(leave.from_date)
    .bind(leave.to_date)
    .bind(leave.total_days)
    .bind(&leave.reason)
    .bind(leave.updated_by)
    .bind(leave.updated_date)
    .bind(leave.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Move a leave into a terminal state and record the approver. Callers
/// guarantee the leave is still pending.
pub async fn set_leave_status(
    tx: &mut Transaction<'_, Postgres>,
    leave: &mut Leave,
    status: LeaveStatus,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    leave.status = status.as_str().to_string();
    leave.approved_by = Some(request_user.id);
    leave.updated_by = Some(request_user.id);
    leave.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET status = $1, approved_by = $2, updated_by = $3, updated_date = $4
        WHERE id = $5"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&leave.status)
    .bind(leave.approved_by)
    .bind(leave.updated_by)
    .bind(leave.updated_date)
    .bind(leave.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_leave(tx: &mut Transaction<'_, Postgres>, leave: &Leave) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(leave.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
