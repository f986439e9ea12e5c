use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        leave_policy::{LeavePolicy, TABLE_NAME},
        user::User,
    },
};

pub async fn paginate_leave_policy(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    limit: u32,
) -> anyhow::Result<(Vec<LeavePolicy>, u32)> {
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
    let data = binds_query_as::<LeavePolicy>(&stmt, vec![])
        .fetch_all(&mut **tx)
        .await?;
    let count = binds_query_as::<(i64,)>(&stmt_count, vec![])
        .fetch_one(&mut **tx)
        .await?;
    Ok((data, count.0 as u32))
}

pub async fn get_leave_policy_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<LeavePolicy>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<LeavePolicy>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

/// Unlocked lookup, used by the create/update feasibility checks. The
/// binding reservation happens only at decide time, under the locked
/// variant below.
pub async fn get_policy_by_user_and_type(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    leave_type_id: &Uuid,
) -> anyhow::Result<Option<LeavePolicy>> {
    let data = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE user_id = $1 AND leave_type_id = $2",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .bind(leave_type_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(data)
}

/// Approval-time lookup. Holds a row-level exclusive lock until the
/// surrounding transaction commits, so concurrent approvals against the
/// same policy serialize.
pub async fn get_policy_by_user_and_type_for_update(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    leave_type_id: &Uuid,
) -> anyhow::Result<Option<LeavePolicy>> {
    let data = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE user_id = $1 AND leave_type_id = $2 FOR UPDATE",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .bind(leave_type_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(data)
}

/// Conditional decrement of the remaining balance. Returns false when the
/// balance cannot cover `days`; the check and the decrement are a single
/// statement, so the ledger can never go negative.
pub async fn reserve_days(
    tx: &mut Transaction<'_, Postgres>,
    policy: &mut LeavePolicy,
    days: i32,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<bool> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let result = sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET remaining_days = remaining_days - $1, updated_by = $2, updated_date = $3
        WHERE id = $4 AND remaining_days >= $1"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(days)
    .bind(request_user.id)
    .bind(now)
    .bind(policy.id)
    .execute(&mut **tx)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }
    policy.remaining_days -= days;
    policy.updated_by = Some(request_user.id);
    policy.updated_date = Some(now);
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_leave_policy(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    user_id: Uuid,
    leave_type_id: Uuid,
    policy_name: Option<String>,
    total_days: i32,
    remaining_days: i32,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<LeavePolicy> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_policy = LeavePolicy {
        id: id.unwrap_or(Uuid::now_v7()),
        user_id,
        leave_type_id,
        policy_name,
        total_days,
        remaining_days,
        created_by: Some(request_user.id),
        updated_by: Some(request_user.id),
        created_date: Some(now),
        updated_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_id, leave_type_id, policy_name, total_days, remaining_days,
    created_by, updated_by, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_policy.id)
    .bind(new_policy.user_id)
    .bind(new_policy.leave_type_id)
    .bind(&new_policy.policy_name)
    .bind(new_policy.total_days)
    .bind(new_policy.remaining_days)
    .bind(new_policy.created_by)
    .bind(new_policy.updated_by)
    .bind(new_policy.created_date)
    .bind(new_policy.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_policy)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_leave_policy(
    tx: &mut Transaction<'_, Postgres>,
    policy: &mut LeavePolicy,
    policy_name: Option<String>,
    total_days: i32,
    remaining_days: i32,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    policy.policy_name = policy_name;
    policy.total_days = total_days;
    policy.remaining_days = remaining_days;
    policy.updated_by = Some(request_user.id);
    policy.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET policy_name = $1, total_days = $2, remaining_days = $3, updated_by = $4, updated_date = $5
        WHERE id = $6"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&policy.policy_name)
    .bind(policy.total_days)
    .bind(policy.remaining_days)
    .bind(policy.updated_by)
    .bind(policy.updated_date)
    .bind(policy.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_leave_policy(
    tx: &mut Transaction<'_, Postgres>,
    policy: &LeavePolicy,
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(policy.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
