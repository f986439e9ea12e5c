use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.attendances";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Attendance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub clock_in: DateTime<FixedOffset>,
    pub clock_out: Option<DateTime<FixedOffset>>,
    pub in_note: Option<String>,
    pub out_note: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
