use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::attendance::{Attendance, TABLE_NAME},
};

pub async fn paginate_attendance(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    limit: u32,
    date: Option<NaiveDate>,
    user_id: Option<Uuid>,
) -> anyhow::Result<(Vec<Attendance>, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(date) = date {
        binds.push(SqlxBinds::Date(date));
        filters.push(format!("date = ${}", binds.len()));
    }
    if let Some(user_id) = user_id {
        binds.push(SqlxBinds::Uuid(user_id));
        filters.push(format!("user_id = ${}", binds.len()));
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
    let data = binds_query_as::<Attendance>(&stmt, binds.clone())
        .fetch_all(&mut **tx)
        .await?;
    let count = binds_query_as::<(i64,)>(&stmt_count, binds)
        .fetch_one(&mut **tx)
        .await?;
    Ok((data, count.0 as u32))
}

pub async fn get_attendance_by_user_and_date(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    date: NaiveDate,
) -> anyhow::Result<Option<Attendance>> {
    let data = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE user_id = $1 AND date = $2",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(data)
}

pub async fn create_attendance(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    user_id: Uuid,
    date: NaiveDate,
    clock_in: DateTime<FixedOffset>,
    in_note: Option<String>,
) -> anyhow::Result<Attendance> {
    let now = Local::now().fixed_offset();
    let new_attendance = Attendance {
        id: id.unwrap_or(Uuid::now_v7()),
        user_id,
        date,
        clock_in,
        clock_out: None,
        in_note,
        out_note: None,
        created_date: Some(now),
        updated_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_id, date, clock_in, clock_out, in_note, out_note,
    created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_attendance.id)
    .bind(new_attendance.user_id)
    .bind(new_attendance.date)
    .bind(new_attendance.clock_in)
    .bind(new_attendance.clock_out)
    .bind(&new_attendance.in_note)
    .bind(&new_attendance.out_note)
    .bind(new_attendance.created_date)
    .bind(new_attendance.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_attendance)
}

pub async fn punch_out_attendance(
    tx: &mut Transaction<'_, Postgres>,
    attendance: &mut Attendance,
    clock_out: DateTime<FixedOffset>,
    out_note: Option<String>,
) -> anyhow::Result<()> {
    let now = Local::now().fixed_offset();
    attendance.clock_out = Some(clock_out);
    attendance.out_note = out_note;
    attendance.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET clock_out = $1, out_note = $2, updated_date = $3
        WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(attendance.clock_out)
    .bind(&attendance.out_note)
    .bind(attendance.updated_date)
    .bind(attendance.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
